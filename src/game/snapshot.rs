//! Serializable table snapshot.

use serde::{Deserialize, Serialize};

use crate::shoe::Shoe;

use super::state::Round;

/// Everything needed to resume a table mid-round.
///
/// The remaining shoe is part of the snapshot so cards already on the table
/// are never dealt twice after a resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// The round in progress.
    pub round: Round,
    /// Cards left to deal.
    pub shoe: Shoe,
}
