use crate::dx12::d3d12;
use std::ops::Range;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ArenaSlots {
    // Per-mip states, indexed by slot. None for freed slots.
    states: Vec<Option<Vec<d3d12::D3D12_RESOURCE_STATES>>>,
    // Bumped each time a slot is reused
    generations: Vec<u64>,
    free_slots: Vec<usize>,
}

/// The tracked states at some point in recording. Restoring one undoes the transitions of a
/// command list that never reached the queue.
pub struct Dx12ResourceStateSnapshot {
    states: Vec<Option<Vec<d3d12::D3D12_RESOURCE_STATES>>>,
    generations: Vec<u64>,
}

/// The state of every tracked texture mip as of the most recently recorded work. Transitions
/// are the only way a tracked state changes, and every transition records its barriers.
#[derive(Default)]
pub struct EmberResourceStateArena {
    slots: Mutex<ArenaSlots>,
}

impl std::fmt::Debug for EmberResourceStateArena {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        let slots = self.slots.lock().unwrap();
        f.debug_struct("EmberResourceStateArena")
            .field("slot_count", &slots.states.len())
            .field("free_slot_count", &slots.free_slots.len())
            .finish()
    }
}

impl EmberResourceStateArena {
    /// Start tracking a texture that is currently in `initial_state`
    pub fn track(
        self: &Arc<Self>,
        resource: d3d12::Dx12Resource,
        initial_state: d3d12::D3D12_RESOURCE_STATES,
    ) -> Dx12TrackedResource {
        let mip_count = resource.desc().subresource_count() as usize;
        let states = vec![initial_state; mip_count];

        let mut slots = self.slots.lock().unwrap();
        let slot = match slots.free_slots.pop() {
            Some(slot) => {
                slots.states[slot] = Some(states);
                slots.generations[slot] += 1;
                slot
            }
            None => {
                slots.states.push(Some(states));
                slots.generations.push(0);
                slots.states.len() - 1
            }
        };

        Dx12TrackedResource {
            arena: self.clone(),
            slot,
            resource,
        }
    }

    fn release(
        &self,
        slot: usize,
    ) {
        let mut slots = self.slots.lock().unwrap();
        slots.states[slot] = None;
        slots.free_slots.push(slot);
    }

    pub fn snapshot(&self) -> Dx12ResourceStateSnapshot {
        let slots = self.slots.lock().unwrap();
        Dx12ResourceStateSnapshot {
            states: slots.states.clone(),
            generations: slots.generations.clone(),
        }
    }

    /// Put back the states of every resource that was tracked when `snapshot` was taken and is
    /// still alive. Resources tracked since then keep their current state.
    pub fn restore(
        &self,
        snapshot: Dx12ResourceStateSnapshot,
    ) {
        let mut slots = self.slots.lock().unwrap();
        let slots = &mut *slots;
        for (slot, (states, generation)) in snapshot
            .states
            .into_iter()
            .zip(snapshot.generations)
            .enumerate()
        {
            if slots.generations.get(slot) != Some(&generation) {
                continue;
            }

            if let (Some(current), Some(states)) = (slots.states[slot].as_mut(), states) {
                *current = states;
            }
        }
    }

    pub fn state(
        &self,
        tracked: &Dx12TrackedResource,
        mip_level: u32,
    ) -> Option<d3d12::D3D12_RESOURCE_STATES> {
        let slots = self.slots.lock().unwrap();
        slots.states[tracked.slot]
            .as_ref()
            .and_then(|states| states.get(mip_level as usize).copied())
    }

    /// Move the given mips into `state_after`. Mips already in that state are left alone, runs
    /// of consecutive mips sharing a state become one barrier each, and a resource whose mips
    /// all move from the same state gets a single all-subresource barrier. Returns the number of
    /// barriers recorded.
    pub fn transition(
        &self,
        command_list: &mut d3d12::Dx12CommandList,
        tracked: &Dx12TrackedResource,
        mip_levels: Range<u32>,
        state_after: d3d12::D3D12_RESOURCE_STATES,
    ) -> usize {
        let mut slots = self.slots.lock().unwrap();
        let states = match slots.states[tracked.slot].as_mut() {
            Some(states) => states,
            None => return 0,
        };

        let mip_count = states.len() as u32;
        let mip_levels = mip_levels.start.min(mip_count)..mip_levels.end.min(mip_count);

        let covers_every_mip = mip_levels == (0..mip_count);
        let first_state = states.get(mip_levels.start as usize).copied();
        let all_agree = states[mip_levels.start as usize..mip_levels.end as usize]
            .iter()
            .all(|state| Some(*state) == first_state);

        let mut barriers = Vec::new();
        if covers_every_mip && all_agree {
            if let Some(state_before) = first_state {
                if state_before != state_after {
                    barriers.push(d3d12::Dx12TransitionBarrier {
                        resource: tracked.resource.clone(),
                        subresource: d3d12::D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                        subresource_count: 0,
                        state_before: state_before,
                        state_after: state_after,
                    });
                }
            }
        } else {
            let mut mip_level = mip_levels.start;
            while mip_level < mip_levels.end {
                let state_before = states[mip_level as usize];
                let mut run_end = mip_level + 1;
                while run_end < mip_levels.end && states[run_end as usize] == state_before {
                    run_end += 1;
                }

                if state_before != state_after {
                    barriers.push(d3d12::Dx12TransitionBarrier {
                        resource: tracked.resource.clone(),
                        subresource: mip_level,
                        subresource_count: run_end - mip_level,
                        state_before: state_before,
                        state_after: state_after,
                    });
                }
                mip_level = run_end;
            }
        }

        for state in &mut states[mip_levels.start as usize..mip_levels.end as usize] {
            *state = state_after;
        }

        command_list.resource_barrier(&barriers);
        barriers.len()
    }
}

/// A texture whose per-mip state lives in the arena. The slot is released on drop.
pub struct Dx12TrackedResource {
    arena: Arc<EmberResourceStateArena>,
    slot: usize,
    resource: d3d12::Dx12Resource,
}

impl std::fmt::Debug for Dx12TrackedResource {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("Dx12TrackedResource")
            .field("slot", &self.slot)
            .field("resource", &self.resource)
            .finish()
    }
}

impl Drop for Dx12TrackedResource {
    fn drop(&mut self) {
        self.arena.release(self.slot);
    }
}

impl Dx12TrackedResource {
    pub fn dx12_resource(&self) -> &d3d12::Dx12Resource {
        &self.resource
    }

    pub fn mip_count(&self) -> u32 {
        self.resource.desc().subresource_count()
    }

    pub fn state(
        &self,
        mip_level: u32,
    ) -> Option<d3d12::D3D12_RESOURCE_STATES> {
        self.arena.state(self, mip_level)
    }

    pub fn transition(
        &self,
        command_list: &mut d3d12::Dx12CommandList,
        mip_levels: Range<u32>,
        state_after: d3d12::D3D12_RESOURCE_STATES,
    ) -> usize {
        self.arena
            .transition(command_list, self, mip_levels, state_after)
    }

    pub fn transition_all(
        &self,
        command_list: &mut d3d12::Dx12CommandList,
        state_after: d3d12::D3D12_RESOURCE_STATES,
    ) -> usize {
        self.transition(command_list, 0..self.mip_count(), state_after)
    }
}
