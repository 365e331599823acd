// Application layer - Use case interactors

pub mod container;
pub mod inspect_interactor;
pub mod prepare_interactor;

// Re-export interactors
pub use inspect_interactor::InspectInteractor;
pub use prepare_interactor::PrepareInteractor;
