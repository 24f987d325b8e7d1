pub mod actor_resolver;
pub mod authorizator;
pub mod role_colors;

pub use actor_resolver::ActorResolver;
pub use authorizator::{BulkAction, DocumentBulkActionAuthorizator};
pub use role_colors::{ColorPair, RoleColors};
