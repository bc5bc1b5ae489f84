mod api;
mod provider;

pub use api::{PointId, ScoredPoint, StoredPoint, VectorApiClient};
pub use provider::VectorSearchProvider;
