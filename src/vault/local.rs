//! Local filesystem vault: markdown notes with YAML frontmatter.

use std::{
   collections::{BTreeMap, HashMap},
   path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::{
   error::{Result, VaultError},
   vault::{DocMeta, Document, META_KEY_ID, META_KEY_SYNCED, MetaPatch, Vault},
};

const NOTE_EXTENSION: &str = "md";
const FRONTMATTER_FENCE: &str = "---";

/// Vault backed by a directory tree of `.md` files. Frontmatter is a YAML
/// mapping between `---` fences at the top of the file; everything after it
/// is user-owned note body.
pub struct LocalVault {
   root:  PathBuf,
   cache: RwLock<HashMap<PathBuf, DocMeta>>,
}

impl LocalVault {
   pub fn new(root: impl Into<PathBuf>) -> Self {
      Self { root: root.into(), cache: RwLock::new(HashMap::new()) }
   }

   pub fn root(&self) -> &Path {
      &self.root
   }

   fn absolute(&self, rel: &Path) -> PathBuf {
      self.root.join(rel)
   }

   fn collect_notes(&self, dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
      for entry in std::fs::read_dir(dir)? {
         let entry = entry?;
         let path = entry.path();
         let name = entry.file_name();
         if name.to_string_lossy().starts_with('.') {
            continue;
         }
         if path.is_dir() {
            self.collect_notes(&path, out)?;
            continue;
         }
         if path.extension().and_then(|e| e.to_str()) == Some(NOTE_EXTENSION) {
            out.push(path);
         }
      }
      Ok(())
   }

   async fn read_note(&self, rel: &Path) -> Result<String> {
      let abs = self.absolute(rel);
      tokio::fs::read_to_string(&abs)
         .await
         .map_err(|reason| VaultError::Read { path: rel.to_path_buf(), reason }.into())
   }

   async fn write_note(&self, rel: &Path, content: &str) -> Result<()> {
      let abs = self.absolute(rel);
      tokio::fs::write(&abs, content)
         .await
         .map_err(|reason| VaultError::Write { path: rel.to_path_buf(), reason }.into())
   }
}

#[async_trait]
impl Vault for LocalVault {
   async fn list_documents(&self) -> Result<Vec<Document>> {
      let mut files: Vec<PathBuf> = Vec::new();
      self
         .collect_notes(&self.root, &mut files)
         .map_err(|reason| VaultError::List { root: self.root.clone(), reason })?;
      files.sort();

      let mut documents = Vec::with_capacity(files.len());
      let mut cache = HashMap::with_capacity(files.len());

      for abs in files {
         let rel = abs
            .strip_prefix(&self.root)
            .unwrap_or(&abs)
            .to_path_buf();
         let metadata = std::fs::metadata(&abs)
            .map_err(|reason| VaultError::Read { path: rel.clone(), reason })?;
         let modified: DateTime<Utc> = metadata
            .modified()
            .map(DateTime::from)
            .unwrap_or_else(|_| Utc::now());

         let content = self.read_note(&rel).await?;
         let (mapping, _body) = split_frontmatter(&content);
         cache.insert(rel.clone(), meta_from_mapping(mapping));
         documents.push(Document { path: rel, modified });
      }

      *self.cache.write() = cache;
      Ok(documents)
   }

   fn cached_metadata(&self, doc: &Document) -> Option<DocMeta> {
      self.cache.read().get(&doc.path).cloned()
   }

   async fn create_document(
      &self,
      folder: &Path,
      filename: &str,
      meta: &MetaPatch,
      content: &str,
   ) -> Result<Document> {
      let rel = folder.join(filename);
      let mut mapping = BTreeMap::new();
      apply_patch(&mut mapping, meta);
      let rendered = render_note(&mapping, content)
         .map_err(|reason| VaultError::Frontmatter { path: rel.clone(), reason })?;
      self.write_note(&rel, &rendered).await?;

      self.cache.write().insert(rel.clone(), meta_from_mapping(mapping));
      Ok(Document { path: rel, modified: Utc::now() })
   }

   async fn merge_metadata(&self, doc: &Document, patch: &MetaPatch) -> Result<()> {
      let abs = self.absolute(&doc.path);
      if !abs.is_file() {
         return Err(VaultError::NotFound { path: doc.path.clone() }.into());
      }

      let content = self.read_note(&doc.path).await?;
      let (mut mapping, body) = split_frontmatter(&content);
      apply_patch(&mut mapping, patch);
      let rendered = render_note(&mapping, &body)
         .map_err(|reason| VaultError::Frontmatter { path: doc.path.clone(), reason })?;
      self.write_note(&doc.path, &rendered).await?;

      self.cache.write().insert(doc.path.clone(), meta_from_mapping(mapping));
      Ok(())
   }

   async fn unique_name(&self, folder: &Path, base: &str) -> Result<String> {
      let mut candidate = format!("{base}.{NOTE_EXTENSION}");
      let mut counter = 1usize;
      while self.absolute(&folder.join(&candidate)).exists() {
         candidate = format!("{base} ({counter}).{NOTE_EXTENSION}");
         counter += 1;
      }
      Ok(candidate)
   }

   async fn ensure_folder(&self, folder: &Path) -> Result<()> {
      let abs = self.absolute(folder);
      tokio::fs::create_dir_all(&abs)
         .await
         .map_err(|reason| VaultError::CreateFolder { path: folder.to_path_buf(), reason }.into())
   }
}

type Mapping = BTreeMap<String, serde_yaml::Value>;

fn is_fence(line: &str) -> bool {
   line.trim_end_matches('\r') == FRONTMATTER_FENCE
}

/// Splits a note into its frontmatter mapping and body. Fence lines may
/// carry CRLF line endings. Notes without a parseable frontmatter block
/// yield an empty mapping and the full content as body.
fn split_frontmatter(content: &str) -> (Mapping, String) {
   let Some(first_break) = content.find('\n') else {
      return (Mapping::new(), content.to_string());
   };
   if !is_fence(&content[..first_break]) {
      return (Mapping::new(), content.to_string());
   }
   let rest = &content[first_break + 1..];

   // Scan for the closing fence line; everything before it is YAML and
   // everything after it is user body.
   let mut offset = 0;
   while offset <= rest.len() {
      let line_end = rest[offset..].find('\n').map(|i| offset + i);
      let line = match line_end {
         Some(end) => &rest[offset..end],
         None => &rest[offset..],
      };
      if is_fence(line) {
         let yaml = &rest[..offset];
         let body = line_end.map_or("", |end| &rest[end + 1..]);
         return match serde_yaml::from_str::<Mapping>(yaml) {
            Ok(mapping) => (mapping, body.to_string()),
            Err(_) => (Mapping::new(), content.to_string()),
         };
      }
      match line_end {
         Some(end) => offset = end + 1,
         None => break,
      }
   }
   (Mapping::new(), content.to_string())
}

fn meta_from_mapping(mapping: Mapping) -> DocMeta {
   let mut meta = DocMeta::default();
   for (key, value) in mapping {
      match key.as_str() {
         META_KEY_ID => meta.media_id = value.as_str().map(ToString::to_string),
         META_KEY_SYNCED => meta.synced = value.as_str().map(ToString::to_string),
         _ => {
            meta.extra.insert(key, value);
         },
      }
   }
   meta
}

fn apply_patch(mapping: &mut Mapping, patch: &MetaPatch) {
   mapping.insert(
      META_KEY_ID.to_string(),
      serde_yaml::Value::String(patch.media_id.clone()),
   );
   if let Some(synced) = &patch.synced {
      mapping.insert(
         META_KEY_SYNCED.to_string(),
         serde_yaml::Value::String(synced.clone()),
      );
   }
}

fn render_note(mapping: &Mapping, body: &str) -> Result<String, serde_yaml::Error> {
   let yaml = serde_yaml::to_string(mapping)?;
   Ok(format!("{FRONTMATTER_FENCE}\n{yaml}{FRONTMATTER_FENCE}\n{body}"))
}
