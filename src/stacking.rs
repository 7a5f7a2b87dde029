//! Front-to-back ordering of notes on the board.
//!
//! Every note on the board holds a distinct rank; higher ranks draw on top.
//! Picking a note up moves it to the top. Ranks only grow, so once the next
//! rank would pass the ceiling the whole stack is packed back down to
//! `1..=n`, keeping the relative order of everything else.

use std::collections::HashMap;

use crate::task::TaskId;

/// Highest rank handed out before the stack is packed down again.
pub const DEFAULT_STACK_CEILING: u32 = 19;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackOrder {
    ranks: HashMap<TaskId, u32>,
}

impl StackOrder {
    /// Rank notes by their position in the collection, first note at the bottom.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a TaskId>) -> Self {
        let ranks = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i as u32 + 1))
            .collect();
        StackOrder { ranks }
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<u32> {
        self.ranks.get(id).copied()
    }

    /// Current top rank, 0 for an empty board.
    pub fn max(&self) -> u32 {
        self.ranks.values().copied().max().unwrap_or(0)
    }

    /// Place a new note on top of the stack and return its rank.
    pub fn push_top(&mut self, id: TaskId) -> u32 {
        let rank = self.max() + 1;
        self.ranks.insert(id, rank);
        rank
    }

    /// Bring a note to the front. Returns the new rank and whether the stack
    /// had to be packed down, or `None` for an unknown id.
    pub fn raise(&mut self, id: &TaskId, ceiling: u32) -> Option<(u32, bool)> {
        if !self.ranks.contains_key(id) {
            return None;
        }
        let next = self.max() + 1;
        if next <= ceiling {
            self.ranks.insert(id.clone(), next);
            return Some((next, false));
        }

        let mut others: Vec<(TaskId, u32)> = self
            .ranks
            .iter()
            .filter(|(other, _)| *other != id)
            .map(|(other, rank)| (other.clone(), *rank))
            .collect();
        others.sort_by_key(|(_, rank)| *rank);

        let mut packed = HashMap::with_capacity(self.ranks.len());
        for (i, (other, _)) in others.into_iter().enumerate() {
            packed.insert(other, i as u32 + 1);
        }
        let top = packed.len() as u32 + 1;
        packed.insert(id.clone(), top);
        self.ranks = packed;
        Some((top, true))
    }

    pub fn remove(&mut self, id: &TaskId) -> Option<u32> {
        self.ranks.remove(id)
    }

    /// Ids from the bottom of the stack to the top, i.e. painting order.
    pub fn back_to_front(&self) -> Vec<TaskId> {
        let mut ids: Vec<(&TaskId, u32)> = self.ranks.iter().map(|(id, r)| (id, *r)).collect();
        ids.sort_by_key(|(_, r)| *r);
        ids.into_iter().map(|(id, _)| id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<TaskId> {
        names.iter().map(|n| TaskId::from(*n)).collect()
    }

    #[test]
    fn initial_ranks_follow_collection_order() {
        let all = ids(&["a", "b", "c"]);
        let stack = StackOrder::from_ids(&all);
        assert_eq!(stack.get(&all[0]), Some(1));
        assert_eq!(stack.get(&all[2]), Some(3));
        assert_eq!(stack.max(), 3);
    }

    #[test]
    fn raise_goes_one_above_current_top() {
        let all = ids(&["a", "b"]);
        let mut stack = StackOrder::from_ids(&all);
        assert_eq!(stack.raise(&all[0], DEFAULT_STACK_CEILING), Some((3, false)));
        assert_eq!(stack.get(&all[0]), Some(3));
        assert_eq!(stack.get(&all[1]), Some(2));
    }

    #[test]
    fn raise_past_ceiling_packs_stack_down() {
        let all = ids(&["a", "b", "c"]);
        let mut stack = StackOrder::from_ids(&all);
        // a=1 b=2 c=3 -> b=4 -> a=5, ceiling 5 reached on the next raise
        stack.raise(&all[1], 5);
        stack.raise(&all[0], 5);
        assert_eq!(stack.raise(&all[2], 5), Some((3, true)));
        assert_eq!(stack.get(&all[1]), Some(1));
        assert_eq!(stack.get(&all[0]), Some(2));
        assert_eq!(stack.get(&all[2]), Some(3));
    }

    #[test]
    fn raise_unknown_is_noop() {
        let all = ids(&["a"]);
        let mut stack = StackOrder::from_ids(&all);
        assert_eq!(stack.raise(&TaskId::from("zzz"), DEFAULT_STACK_CEILING), None);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn back_to_front_sorts_by_rank() {
        let all = ids(&["a", "b", "c"]);
        let mut stack = StackOrder::from_ids(&all);
        stack.raise(&all[0], DEFAULT_STACK_CEILING);
        assert_eq!(stack.back_to_front(), ids(&["b", "c", "a"]));
    }
}
