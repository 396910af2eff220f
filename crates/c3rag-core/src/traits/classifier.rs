use crate::models::QueryRoute;

/// Routes queries and flags multi-step requests for decomposition.
pub trait IQueryClassifier: Send + Sync {
    fn classify(&self, query: &str) -> QueryRoute;

    fn is_complex(&self, query: &str) -> bool;
}
