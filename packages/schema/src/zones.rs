use serde::{Deserialize, Serialize};
use std::fmt;

use crate::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Header,
    Body,
    Footer,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 3] = [ZoneKind::Header, ZoneKind::Body, ZoneKind::Footer];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Header => "header",
            ZoneKind::Body => "body",
            ZoneKind::Footer => "footer",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub root_id: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zones {
    pub header: Zone,
    pub body: Zone,
    pub footer: Zone,
}

impl Zones {
    pub fn get(&self, kind: ZoneKind) -> &Zone {
        match kind {
            ZoneKind::Header => &self.header,
            ZoneKind::Body => &self.body,
            ZoneKind::Footer => &self.footer,
        }
    }

    pub fn root_ids(&self) -> [&str; 3] {
        [
            self.header.root_id.as_str(),
            self.body.root_id.as_str(),
            self.footer.root_id.as_str(),
        ]
    }

    pub fn kind_of_root(&self, node_id: &str) -> Option<ZoneKind> {
        ZoneKind::ALL
            .into_iter()
            .find(|kind| self.get(*kind).root_id == node_id)
    }
}
