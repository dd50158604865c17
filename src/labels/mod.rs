pub mod array;
pub mod classes;
pub mod identity;
pub mod store;

pub use array::{LabelArray, UNLABELED};
pub use classes::{ClassId, ClassSet, MAX_CLASSES};
pub use identity::DirectoryIdentity;
pub use store::{restore_labels, JsonLabelStore, LabelStore, StoredLabels};
