//! Chart-of-accounts types.

use serde::{Deserialize, Serialize};

/// Top-level statement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MajorHead {
    /// Assets (`A`).
    #[serde(rename = "A")]
    Assets,
    /// Equity and Liabilities (`B`).
    #[serde(rename = "B")]
    EquityAndLiabilities,
    /// Income and Expense (`C`).
    #[serde(rename = "C")]
    ProfitAndLoss,
}

impl MajorHead {
    /// Returns the chart code for this head.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Assets => "A",
            Self::EquityAndLiabilities => "B",
            Self::ProfitAndLoss => "C",
        }
    }

    /// Parses a chart code. Unknown codes yield `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "A" => Some(Self::Assets),
            "B" => Some(Self::EquityAndLiabilities),
            "C" => Some(Self::ProfitAndLoss),
            _ => None,
        }
    }
}

impl std::fmt::Display for MajorHead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Where a grouping code sits in the chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Grouping display name.
    pub grouping_name: String,
    /// Minor head code (e.g. `B.10`).
    pub minor_head_code: String,
    /// Minor head display name.
    pub minor_head_name: String,
    /// Major head code (`A`, `B` or `C`).
    pub major_head_code: String,
    /// Major head display name.
    pub major_head_name: String,
}

impl Classification {
    /// Returns the parsed major head, if the code is a known one.
    #[must_use]
    pub fn major_head(&self) -> Option<MajorHead> {
        MajorHead::from_code(&self.major_head_code)
    }

    /// True when both classifications roll up to the same minor and major head.
    ///
    /// Display names are ignored; entities may label the same head differently.
    #[must_use]
    pub fn same_heads(&self, other: &Self) -> bool {
        self.minor_head_code == other.minor_head_code
            && self.major_head_code == other.major_head_code
    }
}

/// Major head master row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MajorHeadEntry {
    /// Code.
    pub code: String,
    /// Name.
    pub name: String,
}

/// Minor head master row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinorHeadEntry {
    /// Code.
    pub code: String,
    /// Name.
    pub name: String,
    /// Owning major head.
    pub major_head_code: String,
}

/// Grouping master row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingEntry {
    /// Code.
    pub code: String,
    /// Name.
    pub name: String,
    /// Owning minor head.
    pub minor_head_code: String,
}

/// The chart-of-accounts masters an entity was mapped against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Masters {
    /// Major heads.
    pub major_heads: Vec<MajorHeadEntry>,
    /// Minor heads.
    pub minor_heads: Vec<MinorHeadEntry>,
    /// Groupings.
    pub groupings: Vec<GroupingEntry>,
}
