//! Action-batch index: groups action events by the LLM response that
//! produced them.
//!
//! Built in a single left-to-right pass. Positions are 0-based indices into
//! the input sequence, so a batch's extent (`min_pos..=max_pos`) can be
//! compared directly against cut positions.

use crate::event::{Event, LlmResponseId};
use std::collections::HashMap;

/// One batch: every action a single LLM response produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBatch {
    /// Positions of this batch's actions, in input order (ascending).
    pub positions: Vec<usize>,
    /// Whether the batch's *first* action carries non-empty thinking blocks.
    /// Anchors a tool loop when true.
    pub first_has_thinking: bool,
}

impl ActionBatch {
    /// Position of the batch's first action.
    pub fn min_pos(&self) -> usize {
        self.positions[0]
    }

    /// Position of the batch's last action.
    pub fn max_pos(&self) -> usize {
        self.positions[self.positions.len() - 1]
    }
}

/// Index of all action batches in a sequence, in first-appearance order.
#[derive(Debug, Default)]
pub struct ActionBatchIndex {
    order: Vec<(LlmResponseId, ActionBatch)>,
    by_id: HashMap<LlmResponseId, usize>,
}

impl ActionBatchIndex {
    /// Build the index in one pass over `events`.
    pub fn build(events: &[Event]) -> Self {
        let mut index = Self::default();
        for (pos, event) in events.iter().enumerate() {
            let Some(response_id) = event.llm_response_id() else {
                continue;
            };
            match index.by_id.get(response_id) {
                Some(&slot) => index.order[slot].1.positions.push(pos),
                None => {
                    index.by_id.insert(response_id.clone(), index.order.len());
                    index.order.push((
                        response_id.clone(),
                        ActionBatch {
                            positions: vec![pos],
                            first_has_thinking: event.has_thinking(),
                        },
                    ));
                }
            }
        }
        index
    }

    pub fn get(&self, id: &LlmResponseId) -> Option<&ActionBatch> {
        self.by_id.get(id).map(|&slot| &self.order[slot].1)
    }

    /// Iterate batches in the order their first action appears.
    pub fn iter(&self) -> impl Iterator<Item = (&LlmResponseId, &ActionBatch)> {
        self.order.iter().map(|(id, batch)| (id, batch))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
