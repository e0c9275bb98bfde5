pub mod assignments;

pub mod evaluations;

pub use assignments::configure_assignments_routes;
pub use evaluations::configure_evaluations_routes;
