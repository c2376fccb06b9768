// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Availability {
    Available,
    #[default]
    Unavailable,
    DoNotDisturb,
    Away,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}
