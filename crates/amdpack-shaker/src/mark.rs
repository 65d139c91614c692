//! The mark phase.
//!
//! Files are loaded lazily, the first time something asks for one of their
//! exports. Three work lists drive the pass until all are empty:
//!
//! - `requests`: "module M, give me export X" (or all exports, or nothing
//!   but your side effects);
//! - `black_queue`: nodes that just turned Black and whose references still
//!   have to be followed;
//! - `gray_queue`: classes kept as a shell whose members are decided by the
//!   property names read anywhere in Black code.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use amdpack_config::ShakeLevel;
use amdpack_graph::discovery::{module_path, scan_dependencies};
use amdpack_graph::runtime::{Runtime, read_text};
use amdpack_graph::normalize;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::color::{ColorMap, NodeColor, NodeId};
use crate::error::{Result, ShakeAmbiguity, ShakeError};
use crate::facts::{ExportTarget, FileFacts, Imported, StatementKind, Usages, analyze};
use crate::options::{ImportTarget, ShakeOptions};

/// Globals that are never reported as unresolved.
const KNOWN_GLOBALS: &[&str] = &[
    "AbortController", "Array", "ArrayBuffer", "ArrayLike", "Awaited", "BigInt", "Boolean",
    "Buffer", "DataView", "Date", "Error", "Exclude", "Extract", "Float32Array", "Float64Array",
    "Function", "Infinity", "InstanceType", "Int16Array", "Int32Array", "Int8Array", "Intl",
    "Iterable", "IterableIterator", "Iterator", "JSON", "Map", "Math", "NaN", "NonNullable",
    "Number", "Object", "Omit", "Parameters", "Partial", "Pick", "Promise", "PromiseLike",
    "PropertyKey", "Proxy", "RangeError", "Readonly", "ReadonlyArray", "ReadonlyMap",
    "ReadonlySet", "Record", "Reflect", "RegExp", "Required", "ReturnType", "Set", "String",
    "Symbol", "SyntaxError", "TextDecoder", "TextEncoder", "ThisType", "TypeError", "URL",
    "Uint16Array", "Uint32Array", "Uint8Array", "Uint8ClampedArray", "WeakMap", "WeakRef",
    "WeakSet", "__dirname", "__filename", "arguments", "clearInterval", "clearTimeout",
    "console", "decodeURI", "decodeURIComponent", "define", "document", "encodeURI",
    "encodeURIComponent", "exports", "fetch", "globalThis", "isFinite", "isNaN", "module",
    "navigator", "parseFloat", "parseInt", "process", "queueMicrotask", "require", "self",
    "setInterval", "setTimeout", "structuredClone", "undefined", "window",
];

fn is_known_global(name: &str) -> bool {
    KNOWN_GLOBALS.contains(&name)
}

/// One parsed source file and the nodes allocated for it.
#[derive(Debug)]
pub(crate) struct ShakeFile {
    pub key: String,
    /// Path relative to the source root.
    pub relative: PathBuf,
    pub facts: FileFacts,
    /// Survives even if nothing in it is kept.
    pub needed: bool,
    /// Kept whole: an entry point or an inline entry point.
    pub root: bool,
    pub synthetic: bool,
    pub statements: Vec<NodeId>,
    /// Per statement: its import or export specifier nodes.
    pub specifiers: Vec<Vec<NodeId>>,
    /// Per statement: its class member nodes.
    pub members: Vec<Vec<NodeId>>,
}

impl ShakeFile {
    fn all_nodes(&self) -> Vec<NodeId> {
        self.statements
            .iter()
            .chain(self.specifiers.iter().flatten())
            .chain(self.members.iter().flatten())
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum NodeRef {
    Statement { file: usize, statement: usize },
    Specifier { file: usize, statement: usize, specifier: usize },
    Member { file: usize, statement: usize, member: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Wanted {
    /// Only the module's own side effects.
    Load,
    All,
    Export(String),
}

#[derive(Debug, Clone)]
struct Request {
    module: String,
    wanted: Wanted,
    /// Forwarded through `export *`; a miss is not reported.
    via_star: bool,
    importer: String,
    specifier: String,
}

/// What a Black node asks for once its own references are followed.
enum Follow {
    Import { source: String, wanted: Wanted },
    Declaration(String),
    Nothing,
}

pub(crate) struct Marker<'o> {
    options: &'o ShakeOptions,
    runtime: Arc<dyn Runtime>,
    pub files: Vec<ShakeFile>,
    by_key: FxHashMap<String, usize>,
    missing: FxHashSet<String>,
    pub colors: ColorMap,
    nodes: Vec<NodeRef>,
    black_queue: VecDeque<NodeId>,
    gray_queue: Vec<NodeId>,
    requests: VecDeque<Request>,
    served: FxHashSet<(String, Wanted)>,
    used_members: FxHashSet<String>,
    pub ambiguities: Vec<ShakeAmbiguity>,
}

impl<'o> Marker<'o> {
    pub fn new(options: &'o ShakeOptions, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            options,
            runtime,
            files: Vec::new(),
            by_key: FxHashMap::default(),
            missing: FxHashSet::default(),
            colors: ColorMap::new(),
            nodes: Vec::new(),
            black_queue: VecDeque::new(),
            gray_queue: Vec::new(),
            requests: VecDeque::new(),
            served: FxHashSet::default(),
            used_members: FxHashSet::default(),
            ambiguities: Vec::new(),
        }
    }

    pub fn level(&self) -> ShakeLevel {
        self.options.level
    }

    /// Mark everything reachable from the entry points.
    ///
    /// # Errors
    ///
    /// [`ShakeError::EntryNotFound`] for a missing entry file, and parse or
    /// read failures of any file that has to be loaded.
    pub async fn run(&mut self) -> Result<()> {
        let options = self.options;
        for id in &options.entry_points {
            let file = self.load_entry(id).await?;
            self.mark_root(file);
        }
        for (index, source) in options.inline_entry_points.iter().enumerate() {
            let key = ShakeOptions::inline_entry_key(index);
            let relative = PathBuf::from(format!("{key}.{}", options.extension));
            let facts = analyze(source.clone(), &options.source_root.join(&relative))?;
            let file = self.add_file(key, relative, facts, true);
            self.mark_root(file);
        }

        loop {
            if let Some(request) = self.requests.pop_front() {
                self.serve(request).await?;
            } else if let Some(node) = self.black_queue.pop_front() {
                self.process_black(node);
            } else if !self.advance_gray() {
                break;
            }
        }

        tracing::debug!(
            files = self.files.len(),
            nodes = self.colors.len(),
            black = self.colors.count(NodeColor::Black),
            gray = self.colors.count(NodeColor::Gray),
            "mark phase finished"
        );
        Ok(())
    }

    /// Modules imported from the kept tree that never became needed, found
    /// by following imports from there.
    pub async fn discarded(&self) -> Result<Vec<String>> {
        let mut seen: FxHashSet<String> = self.files.iter().map(|f| f.key.clone()).collect();
        let mut queue: VecDeque<(String, Vec<String>)> = self
            .files
            .iter()
            .map(|f| {
                let sources = f.facts.import_sources().map(str::to_string).collect();
                (f.key.clone(), sources)
            })
            .collect();

        let mut discarded = Vec::new();
        while let Some((importer, specifiers)) = queue.pop_front() {
            for specifier in specifiers {
                let ImportTarget::Module(key) = self.options.import_target(&importer, &specifier)
                else {
                    continue;
                };
                if !seen.insert(key.clone()) {
                    continue;
                }
                let Ok(path) = self.module_file(&key) else {
                    continue;
                };
                if !self.runtime.exists(&path) {
                    continue;
                }
                let text = read_text(self.runtime.as_ref(), &path)
                    .await
                    .map_err(|source| ShakeError::Read {
                        path: path.clone(),
                        source,
                    })?;
                queue.push_back((key.clone(), scan_dependencies(&text, &path)));
                discarded.push(key);
            }
        }

        for file in self.files.iter().filter(|f| !f.needed) {
            discarded.push(file.key.clone());
        }
        discarded.sort();
        Ok(discarded)
    }

    fn module_file(&self, key: &str) -> Result<PathBuf> {
        Ok(module_path(
            &self.options.source_root,
            key,
            &self.options.extension,
        )?)
    }

    async fn load_entry(&mut self, id: &str) -> Result<usize> {
        let key = normalize(id);
        match self.load(&key).await? {
            Some(file) => Ok(file),
            None => Err(ShakeError::EntryNotFound {
                id: id.to_string(),
                path: self.module_file(&key)?,
            }),
        }
    }

    /// Load and analyse a module, once. `None` if it has no file.
    async fn load(&mut self, key: &str) -> Result<Option<usize>> {
        if let Some(&file) = self.by_key.get(key) {
            return Ok(Some(file));
        }
        if self.missing.contains(key) {
            return Ok(None);
        }

        let path = match self.module_file(key) {
            Ok(path) if self.runtime.exists(&path) => path,
            _ => {
                self.missing.insert(key.to_string());
                return Ok(None);
            }
        };

        let text = read_text(self.runtime.as_ref(), &path)
            .await
            .map_err(|source| ShakeError::Read {
                path: path.clone(),
                source,
            })?;
        let facts = analyze(text, &path)?;
        tracing::debug!(
            module = key,
            statements = facts.statements.len(),
            "analysed source file"
        );

        let relative = path
            .strip_prefix(&self.options.source_root)
            .map(Path::to_path_buf)
            .unwrap_or(path);
        Ok(Some(self.add_file(key.to_string(), relative, facts, false)))
    }

    fn add_file(&mut self, key: String, relative: PathBuf, facts: FileFacts, synthetic: bool) -> usize {
        let file = self.files.len();
        let mut statements = Vec::with_capacity(facts.statements.len());
        let mut specifiers = Vec::with_capacity(facts.statements.len());
        let mut members = Vec::with_capacity(facts.statements.len());

        for (index, statement) in facts.statements.iter().enumerate() {
            statements.push(self.alloc(NodeRef::Statement {
                file,
                statement: index,
            }));
            specifiers.push(
                (0..statement.specifier_count())
                    .map(|specifier| {
                        self.alloc(NodeRef::Specifier {
                            file,
                            statement: index,
                            specifier,
                        })
                    })
                    .collect(),
            );
            members.push(
                (0..statement.members().len())
                    .map(|member| {
                        self.alloc(NodeRef::Member {
                            file,
                            statement: index,
                            member,
                        })
                    })
                    .collect(),
            );
        }

        self.by_key.insert(key.clone(), file);
        self.files.push(ShakeFile {
            key,
            relative,
            facts,
            needed: false,
            root: false,
            synthetic,
            statements,
            specifiers,
            members,
        });
        file
    }

    fn alloc(&mut self, node: NodeRef) -> NodeId {
        self.nodes.push(node);
        self.colors.alloc()
    }

    fn mark_root(&mut self, file: usize) {
        self.files[file].root = true;
        self.set_needed(file);
        self.mark_file_black(file);
    }

    fn mark_file_black(&mut self, file: usize) {
        for node in self.files[file].all_nodes() {
            self.mark_black(node);
        }
    }

    /// Flag a file as surviving and seed its always-kept statements.
    fn set_needed(&mut self, file: usize) {
        if self.files[file].needed {
            return;
        }
        self.files[file].needed = true;

        let forced: Vec<NodeId> = self.files[file]
            .facts
            .statements
            .iter()
            .zip(&self.files[file].statements)
            .filter(|(facts, _)| facts.always_kept)
            .map(|(_, node)| *node)
            .collect();
        for node in forced {
            self.mark_black(node);
        }
    }

    async fn serve(&mut self, request: Request) -> Result<()> {
        let Some(file) = self.load(&request.module).await? else {
            self.ambiguities.push(ShakeAmbiguity::MissingImport {
                module: request.importer,
                specifier: request.specifier,
            });
            return Ok(());
        };
        if !self
            .served
            .insert((request.module.clone(), request.wanted.clone()))
        {
            return Ok(());
        }

        self.set_needed(file);
        if self.options.level == ShakeLevel::Files {
            self.mark_file_black(file);
            return Ok(());
        }

        match &request.wanted {
            Wanted::Load => {}
            Wanted::All => {
                let mut names: Vec<String> = self.files[file].facts.exports.keys().cloned().collect();
                names.sort();
                for name in names {
                    self.mark_export(file, &name);
                }
                self.forward_to_stars(file, Wanted::All);
            }
            Wanted::Export(name) => {
                if !self.mark_export(file, name) {
                    if !self.files[file].facts.star_exports.is_empty() {
                        self.forward_to_stars(file, request.wanted.clone());
                    } else if !request.via_star {
                        self.ambiguities.push(ShakeAmbiguity::UnresolvedExport {
                            module: request.module.clone(),
                            name: name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn forward_to_stars(&mut self, file: usize, wanted: Wanted) {
        let shake_file = &self.files[file];
        let key = shake_file.key.clone();
        let sources: Vec<String> = shake_file
            .facts
            .star_exports
            .iter()
            .filter_map(|&s| match &shake_file.facts.statements[s].kind {
                StatementKind::ExportAll { source, .. } => Some(source.clone()),
                _ => None,
            })
            .collect();
        for source in sources {
            self.request(&key, &source, wanted.clone(), true);
        }
    }

    fn request(&mut self, importer: &str, specifier: &str, wanted: Wanted, via_star: bool) {
        match self.options.import_target(importer, specifier) {
            ImportTarget::Module(module) => self.requests.push_back(Request {
                module,
                wanted,
                via_star,
                importer: importer.to_string(),
                specifier: specifier.to_string(),
            }),
            ImportTarget::Skipped => {}
            ImportTarget::Unresolvable => self.ambiguities.push(ShakeAmbiguity::MissingImport {
                module: importer.to_string(),
                specifier: specifier.to_string(),
            }),
        }
    }

    /// Mark whatever provides export `name`. Returns `false` if the file
    /// declares no such export itself.
    fn mark_export(&mut self, file: usize, name: &str) -> bool {
        let Some(target) = self.files[file].facts.exports.get(name).cloned() else {
            return false;
        };
        match target {
            ExportTarget::Local(local) => self.mark_declaration(file, &local),
            ExportTarget::Statement(statement) => self.mark_statement(file, statement),
            ExportTarget::Specifier(statement, specifier) => {
                let node = self.files[file].specifiers[statement][specifier];
                self.mark_black(node);
            }
        }
        true
    }

    /// Mark the declaration a top-level name refers to.
    fn mark_declaration(&mut self, file: usize, name: &str) {
        let facts = &self.files[file].facts;
        if let Some(&(statement, specifier)) = facts.import_bindings.get(name) {
            let node = self.files[file].specifiers[statement][specifier];
            self.mark_black(node);
            return;
        }
        let Some(statements) = facts.declarations.get(name).cloned() else {
            return;
        };
        for statement in statements {
            self.mark_statement(file, statement);
        }
    }

    fn mark_statement(&mut self, file: usize, statement: usize) {
        let node = self.files[file].statements[statement];
        let is_class = matches!(
            self.files[file].facts.statements[statement].kind,
            StatementKind::Class(_)
        );
        if is_class && self.options.level == ShakeLevel::ClassMembers {
            self.mark_gray(node);
        } else {
            self.mark_black(node);
        }
    }

    fn mark_black(&mut self, node: NodeId) -> bool {
        let changed = self.colors.advance(node, NodeColor::Black);
        if changed {
            self.black_queue.push_back(node);
        }
        changed
    }

    /// Keep a class as a shell: its heritage and decorators, plus the
    /// members that are always kept.
    fn mark_gray(&mut self, node: NodeId) {
        if !self.colors.advance(node, NodeColor::Gray) {
            return;
        }
        let NodeRef::Statement { file, statement } = self.nodes[node.index()] else {
            return;
        };
        self.gray_queue.push(node);

        let usages = self.files[file].facts.statements[statement].usages.clone();
        self.apply_usages(file, &usages);

        let forced: Vec<NodeId> = self.files[file].facts.statements[statement]
            .members()
            .iter()
            .zip(&self.files[file].members[statement])
            .filter(|(member, _)| member.always_kept)
            .map(|(_, node)| *node)
            .collect();
        for member in forced {
            self.mark_black(member);
        }
    }

    fn process_black(&mut self, node: NodeId) {
        match self.nodes[node.index()] {
            NodeRef::Statement { file, statement } => {
                let usages = self.files[file].facts.statements[statement].usages.clone();
                self.apply_usages(file, &usages);

                let parts: Vec<NodeId> = self.files[file].specifiers[statement]
                    .iter()
                    .chain(&self.files[file].members[statement])
                    .copied()
                    .collect();
                for part in parts {
                    self.mark_black(part);
                }

                let follow = match &self.files[file].facts.statements[statement].kind {
                    StatementKind::Import {
                        source, specifiers, ..
                    } if specifiers.is_empty() => Follow::Import {
                        source: source.clone(),
                        wanted: Wanted::Load,
                    },
                    StatementKind::ExportAll { source, namespace } => Follow::Import {
                        source: source.clone(),
                        wanted: if *namespace { Wanted::All } else { Wanted::Load },
                    },
                    _ => Follow::Nothing,
                };
                self.follow(file, follow);
            }
            NodeRef::Specifier {
                file,
                statement,
                specifier,
            } => {
                let parent = self.files[file].statements[statement];
                self.colors.advance(parent, NodeColor::Gray);

                let follow = match &self.files[file].facts.statements[statement].kind {
                    StatementKind::Import {
                        source, specifiers, ..
                    } => Follow::Import {
                        source: source.clone(),
                        wanted: match &specifiers[specifier].imported {
                            Imported::Default => Wanted::Export("default".to_string()),
                            Imported::Namespace => Wanted::All,
                            Imported::Named(name) => Wanted::Export(name.clone()),
                        },
                    },
                    StatementKind::ExportList {
                        source: Some((source, _)),
                        specifiers,
                        ..
                    } => Follow::Import {
                        source: source.clone(),
                        wanted: Wanted::Export(specifiers[specifier].local.clone()),
                    },
                    StatementKind::ExportList {
                        source: None,
                        specifiers,
                        ..
                    } => Follow::Declaration(specifiers[specifier].local.clone()),
                    _ => Follow::Nothing,
                };
                self.follow(file, follow);
            }
            NodeRef::Member {
                file,
                statement,
                member,
            } => {
                let usages = self.files[file].facts.statements[statement].members()[member]
                    .usages
                    .clone();
                self.apply_usages(file, &usages);
            }
        }
    }

    fn follow(&mut self, file: usize, follow: Follow) {
        match follow {
            Follow::Import { source, wanted } => {
                let key = self.files[file].key.clone();
                self.request(&key, &source, wanted, false);
            }
            Follow::Declaration(name) => self.mark_declaration(file, &name),
            Follow::Nothing => {}
        }
    }

    fn apply_usages(&mut self, file: usize, usages: &Usages) {
        for name in &usages.refs {
            self.mark_declaration(file, name);
        }
        self.used_members.extend(usages.members.iter().cloned());
        for name in &usages.unresolved {
            if !is_known_global(name) {
                self.ambiguities.push(ShakeAmbiguity::UnresolvedSymbol {
                    module: self.files[file].key.clone(),
                    name: name.clone(),
                });
            }
        }
    }

    /// Keep members of gray classes whose names are read somewhere in Black
    /// code. Returns `true` if anything changed.
    fn advance_gray(&mut self) -> bool {
        let mut changed = false;
        for index in 0..self.gray_queue.len() {
            let node = self.gray_queue[index];
            if self.colors.get(node) != NodeColor::Gray {
                continue;
            }
            let NodeRef::Statement { file, statement } = self.nodes[node.index()] else {
                continue;
            };

            let used: Vec<NodeId> = self.files[file].facts.statements[statement]
                .members()
                .iter()
                .zip(&self.files[file].members[statement])
                .filter(|(member, node)| {
                    self.colors.get(**node) == NodeColor::White
                        && member
                            .name
                            .as_ref()
                            .is_some_and(|name| self.used_members.contains(name))
                })
                .map(|(_, node)| *node)
                .collect();
            for member in used {
                changed |= self.mark_black(member);
            }
        }
        changed
    }
}
