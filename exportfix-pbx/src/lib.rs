//! Editor for Xcode `project.pbxproj` files.
//!
//! Responsibilities:
//! - Parse the OpenStep property-list text form into an object graph.
//! - Resolve targets and apply idempotent mutations (file references,
//!   frameworks, build properties).
//! - Serialize back in the layout Xcode writes.
//!
//! ```
//! use exportfix_pbx::ProjectDescriptor;
//!
//! let text = r#"{
//!     objects = {
//!         P = {isa = PBXProject; mainGroup = G; targets = (T, ); };
//!         G = {isa = PBXGroup; children = (); sourceTree = "<group>"; };
//!         T = {isa = PBXNativeTarget; name = App; buildConfigurationList = L; buildPhases = (); };
//!         L = {isa = XCConfigurationList; buildConfigurations = (D, ); };
//!         D = {isa = XCBuildConfiguration; name = Debug; buildSettings = {}; };
//!     };
//!     rootObject = P;
//! }"#;
//! let mut project = ProjectDescriptor::parse(text).unwrap();
//! let app = project.target_by_name("App").unwrap();
//! project.add_framework(&app, "GameKit.framework", false).unwrap();
//! project.add_build_property(&app, "OTHER_LDFLAGS", "-ObjC").unwrap();
//! assert!(project.validate().is_ok());
//! let reparsed = ProjectDescriptor::parse(&project.to_pbxproj()).unwrap();
//! assert_eq!(reparsed, project);
//! ```

pub mod edit;
pub mod file_types;
pub mod ids;
mod parse;
pub mod project;
pub mod value;
mod write;

pub use edit::ProjectEdit;
pub use file_types::{PhaseKind, SourceTree};
pub use ids::{BuildFileId, FileRefId, TargetId};
pub use project::{DanglingReference, ProjectDescriptor};
pub use value::{Dict, PbxValue};
