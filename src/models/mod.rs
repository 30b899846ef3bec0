mod category;
mod matching;
mod profile;
mod taste_profile;

pub use category::{Category, UnknownCategory, HIGH_SIGNAL_BONUS};
pub use matching::{
    ExplainedMatch, ExplainedMatchesResponse, Explanation, ExplanationSource, FindMatchesRequest,
    FindMatchesResponse, MatchResult,
};
pub use profile::{
    CandidateRecord, DisplayProfile, InsightItem, ProfileUpsert, SearchEntity, StoredProfile,
    UserTaste,
};
pub use taste_profile::{GeneratedTasteProfile, StoredTasteProfile, TasteProfile, TasteProfileSource};
