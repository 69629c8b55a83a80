//! The project object graph and the mutations the patcher applies to it.

use crate::file_types::{PhaseKind, SourceTree, file_name, file_type_for, phase_label};
use crate::ids::{BuildFileId, FileRefId, TargetId, generate_id};
use crate::parse::{DOCUMENT, parse_document};
use crate::value::{Dict, PbxValue, str_field};
use crate::write::write_document;
use exportfix_types::{PatchError, PatchResult};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const TARGET_ISAS: &[&str] = &["PBXNativeTarget", "PBXAggregateTarget", "PBXLegacyTarget"];

/// Fields whose values are identifiers of other objects in the same graph.
const REFERENCE_KEYS: &[&str] = &[
    "buildConfigurationList",
    "buildConfigurations",
    "buildPhases",
    "buildRules",
    "children",
    "containerPortal",
    "dependencies",
    "fileRef",
    "files",
    "mainGroup",
    "productRef",
    "productRefGroup",
    "productReference",
    "target",
    "targetProxy",
    "targets",
];

/// Build action mask Xcode writes on every phase.
const BUILD_ACTION_MASK: &str = "2147483647";

/// An identifier that does not resolve to an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub owner: String,
    pub key: String,
    pub id: String,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} -> {}", self.owner, self.key, self.id)
    }
}

/// In-memory model of a `project.pbxproj` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    /// Top-level dictionary. Its `objects` entry is kept empty; the real objects
    /// live in `objects` so they can be borrowed independently.
    root: Dict,
    objects: Dict,
    project_name: Option<String>,
}

impl ProjectDescriptor {
    /// Parse the text form. Fails with `Malformed` on unparsable input or when the
    /// top level lacks an `objects` dictionary.
    pub fn parse(text: &str) -> PatchResult<Self> {
        let mut root = parse_document(text)?;
        let objects = match root.get_mut("objects") {
            Some(PbxValue::Dict(objects)) => std::mem::take(objects),
            Some(_) => return Err(PatchError::malformed(DOCUMENT, "'objects' is not a dictionary")),
            None => return Err(PatchError::malformed(DOCUMENT, "missing 'objects' dictionary")),
        };
        debug!(objects = objects.len(), "parsed project descriptor");
        Ok(Self {
            root,
            objects,
            project_name: None,
        })
    }

    /// Name used in comments such as `Build configuration list for PBXProject "<name>"`.
    /// Xcode derives it from the `.xcodeproj` directory name.
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Serialize to the Xcode text form.
    pub fn to_pbxproj(&self) -> String {
        write_document(&self.root, &self.objects, &self.comments())
    }

    pub fn object(&self, id: &str) -> Option<&Dict> {
        self.objects.get(id).and_then(PbxValue::as_dict)
    }

    /// Identifiers of every object.
    pub fn object_ids(&self) -> HashSet<&str> {
        self.objects.keys().map(String::as_str).collect()
    }

    /// All objects with the given `isa`, in file order.
    pub fn objects_of<'a>(&'a self, isa: &'a str) -> impl Iterator<Item = (&'a str, &'a Dict)> + 'a {
        self.objects.iter().filter_map(move |(id, value)| {
            let dict = value.as_dict()?;
            (str_field(dict, "isa") == Some(isa)).then_some((id.as_str(), dict))
        })
    }

    fn object_mut(&mut self, id: &str) -> PatchResult<&mut Dict> {
        self.objects
            .get_mut(id)
            .and_then(PbxValue::as_dict_mut)
            .ok_or_else(|| PatchError::not_found(format!("object {id}")))
    }

    fn insert_object(&mut self, seed: &str, object: Dict) -> String {
        let id = generate_id(&self.objects, seed);
        self.objects.insert(id.clone(), PbxValue::Dict(object));
        id
    }

    fn root_object_id(&self) -> PatchResult<&str> {
        str_field(&self.root, "rootObject")
            .filter(|id| self.objects.contains_key(*id))
            .ok_or_else(|| PatchError::malformed(DOCUMENT, "missing or dangling 'rootObject'"))
    }

    fn project_object(&self) -> PatchResult<&Dict> {
        let id = self.root_object_id()?;
        self.object(id)
            .filter(|d| str_field(d, "isa") == Some("PBXProject"))
            .ok_or_else(|| PatchError::malformed(DOCUMENT, "'rootObject' is not a PBXProject"))
    }

    /// The `PBXProject` object, usable wherever a target is expected to address
    /// project-level build settings.
    pub fn project_id(&self) -> PatchResult<TargetId> {
        self.project_object()?;
        Ok(TargetId(self.root_object_id()?.to_string()))
    }

    /// Resolve a target by its `name`. Fails with `NotFound` when absent.
    pub fn target_by_name(&self, name: &str) -> PatchResult<TargetId> {
        self.objects
            .iter()
            .filter_map(|(id, value)| value.as_dict().map(|d| (id, d)))
            .find(|(_, d)| {
                str_field(d, "isa").is_some_and(|isa| TARGET_ISAS.contains(&isa))
                    && str_field(d, "name") == Some(name)
            })
            .map(|(id, _)| TargetId(id.clone()))
            .ok_or_else(|| PatchError::not_found(format!("target \"{name}\"")))
    }

    /// Target names in the order the project lists them.
    pub fn target_names(&self) -> PatchResult<Vec<String>> {
        let project = self.project_object()?;
        Ok(project
            .get("targets")
            .map(PbxValue::strings)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.object(id).and_then(|t| str_field(t, "name")))
            .map(str::to_string)
            .collect())
    }

    fn target(&self, target: &TargetId) -> PatchResult<&Dict> {
        self.object(target.as_str())
            .ok_or_else(|| PatchError::not_found(format!("target {target}")))
    }

    fn configuration_ids(&self, target: &TargetId) -> PatchResult<Vec<String>> {
        let list_id = str_field(self.target(target)?, "buildConfigurationList")
            .ok_or_else(|| PatchError::not_found(format!("configuration list of {target}")))?;
        let list = self
            .object(list_id)
            .ok_or_else(|| PatchError::not_found(format!("configuration list {list_id}")))?;
        Ok(list
            .get("buildConfigurations")
            .map(PbxValue::strings)
            .unwrap_or_default()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Names of the build configurations of a target (`Debug`, `Release`, ...).
    pub fn configuration_names(&self, target: &TargetId) -> PatchResult<Vec<String>> {
        Ok(self
            .configuration_ids(target)?
            .iter()
            .filter_map(|id| self.object(id).and_then(|c| str_field(c, "name")))
            .map(str::to_string)
            .collect())
    }

    /// Current value of a build setting in one named configuration.
    pub fn build_property(
        &self,
        target: &TargetId,
        configuration: &str,
        key: &str,
    ) -> PatchResult<Option<&PbxValue>> {
        for id in self.configuration_ids(target)? {
            let Some(config) = self.object(&id) else {
                continue;
            };
            if str_field(config, "name") == Some(configuration) {
                return Ok(config
                    .get("buildSettings")
                    .and_then(PbxValue::as_dict)
                    .and_then(|s| s.get(key)));
            }
        }
        Err(PatchError::not_found(format!(
            "configuration \"{configuration}\" of {target}"
        )))
    }

    fn build_settings_mut(&mut self, config_id: &str) -> PatchResult<&mut Dict> {
        let config = self.object_mut(config_id)?;
        config
            .entry("buildSettings".to_string())
            .or_insert_with(|| PbxValue::Dict(Dict::new()))
            .as_dict_mut()
            .ok_or_else(|| {
                PatchError::malformed(DOCUMENT, format!("buildSettings of {config_id} is not a dictionary"))
            })
    }

    /// Overwrite a build setting in every configuration of the target.
    pub fn set_build_property(&mut self, target: &TargetId, key: &str, value: &str) -> PatchResult<()> {
        for config in self.configuration_ids(target)? {
            self.build_settings_mut(&config)?
                .insert(key.to_string(), PbxValue::from(value));
        }
        debug!(target_id = %target, key, value, "set build property");
        Ok(())
    }

    /// Append a value to a build setting in every configuration of the target.
    ///
    /// An absent setting becomes a plain string; a present one becomes a list.
    /// A value already present (as a list item or a space-separated token) is not
    /// added again.
    pub fn add_build_property(&mut self, target: &TargetId, key: &str, value: &str) -> PatchResult<()> {
        for config in self.configuration_ids(target)? {
            let settings = self.build_settings_mut(&config)?;
            let Some(current) = settings.get_mut(key) else {
                settings.insert(key.to_string(), PbxValue::from(value));
                continue;
            };
            match current {
                PbxValue::String(existing) => {
                    if existing.as_str() != value && !existing.split_whitespace().any(|t| t == value) {
                        let old = PbxValue::String(std::mem::take(existing));
                        *current = PbxValue::Array(vec![old, PbxValue::from(value)]);
                    }
                }
                PbxValue::Array(items) => {
                    if !items.iter().any(|i| i.as_str() == Some(value)) {
                        items.push(PbxValue::from(value));
                    }
                }
                _ => {
                    return Err(PatchError::malformed(
                        DOCUMENT,
                        format!("build setting {key} of {config} is not a string or list"),
                    ));
                }
            }
        }
        debug!(target_id = %target, key, value, "added build property");
        Ok(())
    }

    fn main_group_id(&self) -> PatchResult<String> {
        str_field(self.project_object()?, "mainGroup")
            .filter(|id| self.objects.contains_key(*id))
            .map(str::to_string)
            .ok_or_else(|| PatchError::malformed(DOCUMENT, "project has no main group"))
    }

    fn children_mut(&mut self, group: &str) -> PatchResult<&mut Vec<PbxValue>> {
        self.object_mut(group)?
            .entry("children".to_string())
            .or_insert_with(|| PbxValue::Array(vec![]))
            .as_array_mut()
            .ok_or_else(|| PatchError::malformed(DOCUMENT, format!("children of {group} is not a list")))
    }

    fn child_group(&self, parent: &str, label: &str) -> Option<String> {
        self.object(parent)?
            .get("children")?
            .strings()
            .into_iter()
            .find(|id| {
                self.object(id).is_some_and(|g| {
                    str_field(g, "isa") == Some("PBXGroup")
                        && (str_field(g, "name") == Some(label)
                            || (g.get("name").is_none() && str_field(g, "path") == Some(label)))
                })
            })
            .map(str::to_string)
    }

    /// Walk (and create where missing) the group chain below the main group.
    fn ensure_group_chain(&mut self, components: &[&str]) -> PatchResult<String> {
        let mut current = self.main_group_id()?;
        for component in components {
            current = match self.child_group(&current, component) {
                Some(existing) => existing,
                None => {
                    let mut group = Dict::new();
                    group.insert("isa".into(), "PBXGroup".into());
                    group.insert("children".into(), PbxValue::Array(vec![]));
                    group.insert("name".into(), (*component).into());
                    group.insert("sourceTree".into(), SourceTree::Group.as_str().into());
                    let id = self.insert_object(&format!("PBXGroup:{current}:{component}"), group);
                    self.children_mut(&current)?.push(PbxValue::String(id.clone()));
                    id
                }
            };
        }
        Ok(current)
    }

    fn find_file_ref(&self, path: &str, tree: SourceTree) -> Option<FileRefId> {
        self.objects_of("PBXFileReference")
            .find(|(_, f)| {
                str_field(f, "path") == Some(path) && str_field(f, "sourceTree") == Some(tree.as_str())
            })
            .map(|(id, _)| FileRefId(id.to_string()))
    }

    fn new_file_ref(path: &str, display_name: &str, tree: SourceTree) -> Dict {
        let mut file = Dict::new();
        file.insert("isa".into(), "PBXFileReference".into());
        if let Some(ty) = file_type_for(path) {
            file.insert("lastKnownFileType".into(), ty.into());
        }
        if display_name != path {
            file.insert("name".into(), display_name.into());
        }
        file.insert("path".into(), path.into());
        file.insert("sourceTree".into(), tree.as_str().into());
        file
    }

    /// Add a file reference at `project_path` in the navigator, creating groups
    /// along the way. `path` is resolved relative to `tree`. Adding the same
    /// path again returns the existing reference.
    pub fn add_file(&mut self, path: &str, project_path: &str, tree: SourceTree) -> PatchResult<FileRefId> {
        if let Some(existing) = self.find_file_ref(path, tree) {
            debug!(path, "file reference already present");
            return Ok(existing);
        }

        let mut components: Vec<&str> = project_path
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .collect();
        let display_name = components.pop().unwrap_or_else(|| file_name(path));
        let group = self.ensure_group_chain(&components)?;

        let file = Self::new_file_ref(path, display_name, tree);
        let id = self.insert_object(&format!("PBXFileReference:{path}:{tree}"), file);
        self.children_mut(&group)?.push(PbxValue::String(id.clone()));
        debug!(path, project_path, id = id.as_str(), "added file reference");
        Ok(FileRefId(id))
    }

    /// The target's phase of the given kind, created and appended when missing.
    fn ensure_phase(&mut self, target: &TargetId, kind: PhaseKind) -> PatchResult<String> {
        let phases: Vec<String> = self
            .target(target)?
            .get("buildPhases")
            .map(PbxValue::strings)
            .unwrap_or_default()
            .into_iter()
            .map(str::to_string)
            .collect();
        if let Some(existing) = phases
            .into_iter()
            .find(|id| self.object(id).and_then(|p| str_field(p, "isa")) == Some(kind.isa()))
        {
            return Ok(existing);
        }

        let mut phase = Dict::new();
        phase.insert("isa".into(), kind.isa().into());
        phase.insert("buildActionMask".into(), BUILD_ACTION_MASK.into());
        phase.insert("files".into(), PbxValue::Array(vec![]));
        phase.insert("runOnlyForDeploymentPostprocessing".into(), "0".into());
        let id = self.insert_object(&format!("{}:{target}", kind.isa()), phase);
        self.object_mut(target.as_str())?
            .entry("buildPhases".to_string())
            .or_insert_with(|| PbxValue::Array(vec![]))
            .as_array_mut()
            .ok_or_else(|| PatchError::malformed(DOCUMENT, format!("buildPhases of {target} is not a list")))?
            .push(PbxValue::String(id.clone()));
        debug!(target_id = %target, phase = kind.isa(), "created build phase");
        Ok(id)
    }

    /// Build files of a phase paired with the file reference each points at.
    fn phase_files(&self, phase: &str) -> Vec<(String, String)> {
        self.object(phase)
            .and_then(|p| p.get("files"))
            .map(PbxValue::strings)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|bf| {
                let file_ref = str_field(self.object(bf)?, "fileRef")?;
                Some((bf.to_string(), file_ref.to_string()))
            })
            .collect()
    }

    fn attach_build_file(&mut self, phase: &str, file: &FileRefId, weak: bool) -> PatchResult<BuildFileId> {
        let mut build_file = Dict::new();
        build_file.insert("isa".into(), "PBXBuildFile".into());
        build_file.insert("fileRef".into(), file.as_str().into());
        if weak {
            let mut settings = Dict::new();
            settings.insert("ATTRIBUTES".into(), PbxValue::Array(vec!["Weak".into()]));
            build_file.insert("settings".into(), PbxValue::Dict(settings));
        }
        let id = self.insert_object(&format!("PBXBuildFile:{phase}:{file}"), build_file);
        self.object_mut(phase)?
            .entry("files".to_string())
            .or_insert_with(|| PbxValue::Array(vec![]))
            .as_array_mut()
            .ok_or_else(|| PatchError::malformed(DOCUMENT, format!("files of {phase} is not a list")))?
            .push(PbxValue::String(id.clone()));
        Ok(BuildFileId(id))
    }

    /// Attach a file reference to the target's build phase matching its type.
    pub fn add_file_to_build(&mut self, target: &TargetId, file: &FileRefId) -> PatchResult<BuildFileId> {
        let file_obj = self
            .object(file.as_str())
            .ok_or_else(|| PatchError::not_found(format!("file reference {file}")))?;
        let kind = PhaseKind::for_path(str_field(file_obj, "path").unwrap_or_default());
        let phase = self.ensure_phase(target, kind)?;

        if let Some((existing, _)) = self
            .phase_files(&phase)
            .into_iter()
            .find(|(_, file_ref)| file_ref == file.as_str())
        {
            debug!(file = %file, "file already in build phase");
            return Ok(BuildFileId(existing));
        }
        self.attach_build_file(&phase, file, false)
    }

    /// `add_file` followed by `add_file_to_build`.
    pub fn add_file_reference(
        &mut self,
        target: &TargetId,
        source_path: &str,
        project_path: &str,
        tree: SourceTree,
    ) -> PatchResult<FileRefId> {
        let file = self.add_file(source_path, project_path, tree)?;
        self.add_file_to_build(target, &file)?;
        Ok(file)
    }

    /// Link a system framework (or `.tbd`/`.dylib`) into the target. A framework
    /// of the same name already linked by the target is left alone.
    pub fn add_framework(&mut self, target: &TargetId, name: &str, weak: bool) -> PatchResult<FileRefId> {
        let phase = self.ensure_phase(target, PhaseKind::Frameworks)?;
        for (_, file_ref) in self.phase_files(&phase) {
            let Some(file) = self.object(&file_ref) else {
                continue;
            };
            let label = str_field(file, "name").or_else(|| str_field(file, "path").map(file_name));
            if label == Some(name) {
                debug!(framework = name, "framework already linked");
                return Ok(FileRefId(file_ref));
            }
        }

        let path = if name.ends_with(".tbd") || name.ends_with(".dylib") {
            format!("usr/lib/{name}")
        } else {
            format!("System/Library/Frameworks/{name}")
        };
        let file = match self.find_file_ref(&path, SourceTree::Sdk) {
            Some(existing) => existing,
            None => {
                let main = self.main_group_id()?;
                let group = self.child_group(&main, "Frameworks").unwrap_or(main);
                let id = self.insert_object(
                    &format!("PBXFileReference:{path}:{}", SourceTree::Sdk),
                    Self::new_file_ref(&path, name, SourceTree::Sdk),
                );
                self.children_mut(&group)?.push(PbxValue::String(id.clone()));
                FileRefId(id)
            }
        };
        self.attach_build_file(&phase, &file, weak)?;
        debug!(target_id = %target, framework = name, weak, "linked framework");
        Ok(file)
    }

    /// References that do not resolve to an object.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut out = Vec::new();
        if let Some(root) = str_field(&self.root, "rootObject")
            && !self.objects.contains_key(root)
        {
            out.push(DanglingReference {
                owner: "<root>".to_string(),
                key: "rootObject".to_string(),
                id: root.to_string(),
            });
        }
        for (owner, value) in &self.objects {
            let Some(object) = value.as_dict() else {
                continue;
            };
            for key in REFERENCE_KEYS {
                let Some(refs) = object.get(*key) else {
                    continue;
                };
                for id in refs.strings() {
                    if !self.objects.contains_key(id) {
                        out.push(DanglingReference {
                            owner: owner.clone(),
                            key: key.to_string(),
                            id: id.to_string(),
                        });
                    }
                }
            }
        }
        out
    }

    /// Fail with `Malformed` when any reference dangles.
    pub fn validate(&self) -> PatchResult<()> {
        let dangling = self.dangling_references();
        if dangling.is_empty() {
            return Ok(());
        }
        let listed: Vec<String> = dangling.iter().take(5).map(ToString::to_string).collect();
        Err(PatchError::malformed(
            DOCUMENT,
            format!(
                "{} dangling reference(s): {}",
                dangling.len(),
                listed.join(", ")
            ),
        ))
    }

    /// Comment shown after each identifier in the text form.
    fn comments(&self) -> HashMap<String, String> {
        let mut phase_of: HashMap<&str, String> = HashMap::new();
        let mut list_owner: HashMap<&str, String> = HashMap::new();
        for (id, value) in &self.objects {
            let Some(object) = value.as_dict() else {
                continue;
            };
            let isa = str_field(object, "isa").unwrap_or_default();
            if isa.ends_with("BuildPhase") {
                for file in object.get("files").map(PbxValue::strings).unwrap_or_default() {
                    phase_of.insert(file, phase_comment(isa, object));
                }
            }
            if let Some(list) = str_field(object, "buildConfigurationList") {
                let name = if isa == "PBXProject" {
                    self.project_name.as_deref().unwrap_or("Project")
                } else {
                    str_field(object, "name").unwrap_or(id.as_str())
                };
                list_owner.insert(list, format!("{isa} \"{name}\""));
            }
        }

        let mut comments = HashMap::new();
        for (id, value) in &self.objects {
            let Some(object) = value.as_dict() else {
                continue;
            };
            let isa = str_field(object, "isa").unwrap_or_default();
            let comment = match isa {
                "PBXBuildFile" => {
                    let file = str_field(object, "fileRef")
                        .or_else(|| str_field(object, "productRef"))
                        .and_then(|r| self.object(r))
                        .and_then(object_label)
                        .unwrap_or_else(|| "(null)".to_string());
                    let phase = phase_of.get(id.as_str()).map_or("(null)", String::as_str);
                    format!("{file} in {phase}")
                }
                "PBXProject" => "Project object".to_string(),
                "XCConfigurationList" => match list_owner.get(id.as_str()) {
                    Some(owner) => format!("Build configuration list for {owner}"),
                    None => "Build configuration list".to_string(),
                },
                _ if isa.ends_with("BuildPhase") => phase_comment(isa, object),
                "PBXTargetDependency" | "PBXContainerItemProxy" => isa.to_string(),
                _ => match object_label(object) {
                    Some(label) => label,
                    None => continue,
                },
            };
            comments.insert(id.clone(), comment);
        }
        comments
    }
}

fn object_label(object: &Dict) -> Option<String> {
    str_field(object, "name")
        .or_else(|| str_field(object, "path"))
        .or_else(|| str_field(object, "productName"))
        .map(str::to_string)
}

fn phase_comment(isa: &str, phase: &Dict) -> String {
    str_field(phase, "name").unwrap_or_else(|| phase_label(isa)).to_string()
}

impl FromStr for ProjectDescriptor {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectDescriptor::parse(s)
    }
}

impl fmt::Display for ProjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pbxproj())
    }
}
