pub mod candidate;
pub mod recipe;
pub mod request;

pub use candidate::{Candidate, CandidateId, LocalDetails, MalformedCandidate, Provenance};
pub use recipe::{ExternalRecipe, LocalRecipe};
pub use request::{
    RecommendationOptions, RecommendationPayload, RecommendationRequest, Strategy,
    DEFAULT_MAX_EXTERNAL_RESULTS, DEFAULT_MAX_LOCAL_RESULTS, MAX_RESULTS_LIMIT,
};
