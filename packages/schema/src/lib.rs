pub mod breakpoint;
pub mod error;
pub mod id_generator;
pub mod node;
mod number;
pub mod page;
pub mod parent_index;
pub mod props;
pub mod resolve;
pub mod seed;
pub mod tokens;
mod validate;
pub mod zones;

pub use breakpoint::Breakpoint;
pub use error::{SchemaError, SchemaResult};
pub use id_generator::{page_seed, IdGenerator};
pub use node::{Node, NodeId, NodeType, ResponsiveProps};
pub use page::Page;
pub use parent_index::ParentIndex;
pub use props::{
    Align, Background, Direction, EdgeInsets, Justify, PropKey, PropPatch, PropValue, PropertyBag,
};
pub use resolve::PropsResolver;
pub use seed::home_page;
pub use tokens::DesignTokens;
pub use zones::{Zone, ZoneKind, Zones};
