pub mod family;
pub mod form;
pub mod page;
pub mod reference;

pub use family::{
    FamilyDraft, FamilyRecord, FamilyRefs, MAX_IMAGES, MAX_VIDEOS, SavedRecord, SequenceTarget,
    Sequenced, SubFamilyDraft, SubFamilyRecord, SubFamilyRefs, sort_by_sequence, validate_media,
    validate_sequence,
};
pub use form::{FamilyForm, SubFamilyForm};
pub use page::{Page, PageQuery};
pub use reference::{NewReference, ReferenceEntity};
