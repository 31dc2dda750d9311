use serde::{Deserialize, Serialize};

/// Kind of shared master-data entity a free-text field resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Brand,
    ProductCategory,
    ConditionCategory,
    Storage,
    Ram,
    Color,
}

impl ReferenceKind {
    pub const ALL: [Self; 6] = [
        Self::Brand,
        Self::ProductCategory,
        Self::ConditionCategory,
        Self::Storage,
        Self::Ram,
        Self::Color,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::ProductCategory => "product_category",
            Self::ConditionCategory => "condition_category",
            Self::Storage => "storage",
            Self::Ram => "ram",
            Self::Color => "color",
        }
    }

    /// Prefix of every code allocated for this kind (e.g. `BRD00A`).
    #[must_use]
    pub const fn code_prefix(self) -> &'static str {
        match self {
            Self::Brand => "BRD",
            Self::ProductCategory => "PRC",
            Self::ConditionCategory => "CND",
            Self::Storage => "STR",
            Self::Ram => "RAM",
            Self::Color => "CLR",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReferenceKind {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                crate::error::CoreError::InvalidInput(format!("unknown reference kind '{s}'"))
            })
    }
}
