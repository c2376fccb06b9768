// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use jid::BareJid;

#[derive(Clone, PartialEq, Eq, Hash)]
/// The bare address of a MUC room, e.g. `room@conference.prose.org`.
pub struct RoomId(BareJid);

impl RoomId {
    pub fn into_inner(self) -> BareJid {
        self.0
    }
}

impl From<BareJid> for RoomId {
    fn from(value: BareJid) -> Self {
        RoomId(value)
    }
}

impl Deref for RoomId {
    type Target = BareJid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Debug for RoomId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RoomId({})", self.0)
    }
}

impl Display for RoomId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = jid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(BareJid::from_str(s)?))
    }
}
