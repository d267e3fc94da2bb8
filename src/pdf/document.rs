use crate::error::{AssemblyError, AssemblyResult};
use crate::pdf::port::{DocumentPort, OutputDocument, SourceHandle};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Deeper page trees than this are treated as malformed
const MAX_TREE_DEPTH: usize = 64;

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// [`DocumentPort`] backed by lopdf
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfPort;

impl DocumentPort for LopdfPort {
    type Page = PdfPage;
    type Source = PdfDocument;
    type Output = PdfOutput;

    fn open(&self, path: &Path) -> AssemblyResult<PdfDocument> {
        PdfDocument::open(path)
    }

    fn new_document(&self) -> PdfOutput {
        PdfOutput::new()
    }
}

/// An opened source PDF
pub struct PdfDocument {
    doc: Arc<Document>,
    path: PathBuf,
    serial: u64,
    page_ids: Vec<ObjectId>,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> AssemblyResult<Self> {
        let path = path.as_ref();
        let doc = Document::load(path).map_err(|e| AssemblyError::SourceOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // get_pages is keyed by page number, so values come out in page order
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(AssemblyError::SourceOpen {
                path: path.to_path_buf(),
                message: "document has no pages".to_string(),
            });
        }

        log::debug!("Opened {} ({} pages)", path.display(), page_ids.len());
        Ok(PdfDocument {
            doc: Arc::new(doc),
            path: path.to_path_buf(),
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
            page_ids,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get metadata from the document info dictionary
    pub fn info(&self) -> PdfInfo {
        let mut info = PdfInfo {
            page_count: self.page_ids.len() as u32,
            ..PdfInfo::default()
        };

        let dict = self
            .doc
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .and_then(|id| self.doc.get_dictionary(id));
        if let Ok(dict) = dict {
            info.title = get_string_from_dict(dict, b"Title");
            info.author = get_string_from_dict(dict, b"Author");
            info.subject = get_string_from_dict(dict, b"Subject");
            info.creator = get_string_from_dict(dict, b"Creator");
            info.producer = get_string_from_dict(dict, b"Producer");
        }

        info
    }

    /// The page dictionary with inherited attributes copied onto it and the
    /// link back to the source page tree removed
    fn standalone_page(&self, page_id: ObjectId) -> AssemblyResult<Dictionary> {
        let mut page = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| AssemblyError::SourceOpen {
                path: self.path.clone(),
                message: format!("page object {:?}: {}", page_id, e),
            })?
            .clone();

        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;
        while let Some(parent_id) = parent {
            depth += 1;
            if depth > MAX_TREE_DEPTH {
                break;
            }
            let Ok(node) = self.doc.get_dictionary(parent_id) else {
                break;
            };
            for key in INHERITABLE_KEYS {
                if !page.has(key) {
                    if let Ok(value) = node.get(key) {
                        page.set(key, value.clone());
                    }
                }
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }

        page.remove(b"Parent");
        Ok(page)
    }
}

impl SourceHandle for PdfDocument {
    type Page = PdfPage;

    fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    fn page(&self, number: u32) -> AssemblyResult<PdfPage> {
        let page_count = self.page_count();
        if number == 0 || number > page_count {
            return Err(AssemblyError::PageOutOfRange {
                page: number,
                page_count,
            });
        }

        let page_id = self.page_ids[number as usize - 1];
        Ok(PdfPage {
            source: Arc::clone(&self.doc),
            serial: self.serial,
            dict: self.standalone_page(page_id)?,
        })
    }
}

impl Drop for PdfDocument {
    fn drop(&mut self) {
        log::debug!("Closed {}", self.path.display());
    }
}

/// One page pulled out of a [`PdfDocument`], ready to be appended
pub struct PdfPage {
    source: Arc<Document>,
    serial: u64,
    dict: Dictionary,
}

/// A PDF under construction
pub struct PdfOutput {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    /// Source object (by opened-document serial) to its copy in this output
    imported: HashMap<(u64, ObjectId), ObjectId>,
}

impl PdfOutput {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        PdfOutput {
            doc,
            pages_id,
            kids: Vec::new(),
            imported: HashMap::new(),
        }
    }

    fn import_object(&mut self, source: &Document, serial: u64, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.import_reference(source, serial, *id),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.import_object(source, serial, item))
                    .collect(),
            ),
            Object::Dictionary(dict) => {
                Object::Dictionary(self.import_dictionary(source, serial, dict))
            }
            Object::Stream(stream) => {
                let mut stream = stream.clone();
                stream.dict = self.import_dictionary(source, serial, &stream.dict);
                Object::Stream(stream)
            }
            other => other.clone(),
        }
    }

    fn import_dictionary(
        &mut self,
        source: &Document,
        serial: u64,
        dict: &Dictionary,
    ) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            copy.set(key.clone(), self.import_object(source, serial, value));
        }
        copy
    }

    fn import_reference(&mut self, source: &Document, serial: u64, id: ObjectId) -> Object {
        if let Some(&copied) = self.imported.get(&(serial, id)) {
            return Object::Reference(copied);
        }

        let Ok(object) = source.get_object(id) else {
            return Object::Null;
        };
        // Links into the source page tree (annotation /P and the like) are
        // dropped, otherwise the whole source document would follow along
        if matches!(object.type_name(), Ok(b"Page") | Ok(b"Pages")) {
            return Object::Null;
        }

        let new_id = self.doc.new_object_id();
        // Registered before recursing so reference cycles terminate
        self.imported.insert((serial, id), new_id);
        let copy = self.import_object(source, serial, object);
        self.doc.objects.insert(new_id, copy);
        Object::Reference(new_id)
    }
}

impl Default for PdfOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDocument for PdfOutput {
    type Page = PdfPage;

    fn append_page(&mut self, page: PdfPage) {
        let PdfPage {
            source,
            serial,
            dict,
        } = page;
        let mut copy = self.import_dictionary(&source, serial, &dict);
        copy.set("Parent", Object::Reference(self.pages_id));
        let page_id = self.doc.add_object(copy);
        self.kids.push(page_id);
    }

    fn page_count(&self) -> u32 {
        self.kids.len() as u32
    }

    fn save(&mut self, path: &Path) -> AssemblyResult<()> {
        let save_error = |message: String| AssemblyError::Save {
            path: path.to_path_buf(),
            message,
        };

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            (
                "Kids",
                Object::Array(self.kids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
            ("Count", Object::Integer(self.kids.len() as i64)),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        if self.doc.trailer.get(b"Root").is_err() {
            let catalog = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Catalog".to_vec())),
                ("Pages", Object::Reference(self.pages_id)),
            ]);
            let catalog_id = self.doc.add_object(catalog);
            self.doc.trailer.set("Root", Object::Reference(catalog_id));
        }

        // Write next to the destination and rename into place, so a failed
        // write never leaves a truncated file behind
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(|e| save_error(e.to_string()))?;
        self.doc
            .save_to(&mut file)
            .map_err(|e| save_error(e.to_string()))?;
        file.persist(path)
            .map_err(|e| save_error(e.error.to_string()))?;

        log::debug!("Saved {} ({} pages)", path.display(), self.kids.len());
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: u32,
}

fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => None,
    })
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        // UTF-16 BE
        let u16_chars: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        String::from_utf16(&u16_chars).ok()
    } else {
        // PDFDocEncoding, treated as Latin-1
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Stream, StringFormat};

    /// Write an `n`-page PDF whose pages draw "<label> <page number>".
    /// Resources and MediaBox live on the page tree root so pages inherit them.
    pub(crate) fn write_test_pdf(path: &Path, label: &str, num_pages: u32) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        let resources = Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
        )]);

        let mut page_ids = Vec::new();
        for i in 1..=num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                    Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("{} {}", label, i).into_bytes(),
                            StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ]));
            page_ids.push(page_id);
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
            ("Resources", Object::Dictionary(resources)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let info_id = doc.add_object(Dictionary::from_iter(vec![(
            "Title",
            Object::string_literal(format!("{} document", label)),
        )]));
        doc.trailer.set("Info", Object::Reference(info_id));

        doc.save(path).unwrap();
    }

    /// The "<label> <n>" text drawn on each page of a saved PDF, in page order
    pub(crate) fn page_labels(path: &Path) -> Vec<String> {
        let doc = Document::load(path).unwrap();
        doc.get_pages()
            .into_values()
            .map(|page_id| {
                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .find(|op| op.operator == "Tj")
                    .and_then(|op| op.operands.first())
                    .and_then(|text| text.as_str().ok())
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_open_reports_page_count_and_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        write_test_pdf(&path, "A", 3);

        let doc = PdfDocument::open(&path).unwrap();
        assert_eq!(doc.page_count(), 3);
        let info = doc.info();
        assert_eq!(info.page_count, 3);
        assert_eq!(info.title.as_deref(), Some("A document"));
        assert_eq!(info.author, None);
    }

    #[test]
    fn test_open_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"just some text").unwrap();

        let err = PdfDocument::open(&path).err().unwrap();
        assert!(matches!(err, AssemblyError::SourceOpen { .. }));
        assert!(PdfDocument::open(dir.path().join("missing.pdf")).is_err());
    }

    #[test]
    fn test_page_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        write_test_pdf(&path, "A", 2);

        let doc = PdfDocument::open(&path).unwrap();
        assert!(matches!(
            doc.page(0),
            Err(AssemblyError::PageOutOfRange { page: 0, page_count: 2 })
        ));
        assert!(doc.page(3).is_err());
    }

    #[test]
    fn test_pages_copied_in_append_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        write_test_pdf(&a, "A", 3);
        write_test_pdf(&b, "B", 2);

        let out = dir.path().join("out.pdf");
        {
            let doc_a = PdfDocument::open(&a).unwrap();
            let doc_b = PdfDocument::open(&b).unwrap();
            let mut output = PdfOutput::new();
            output.append_page(doc_a.page(3).unwrap());
            output.append_page(doc_b.page(1).unwrap());
            output.append_page(doc_a.page(1).unwrap());
            assert_eq!(output.page_count(), 3);
            output.save(&out).unwrap();
        }

        assert_eq!(page_labels(&out), vec!["A 3", "B 1", "A 1"]);
    }

    #[test]
    fn test_inherited_attributes_are_materialized() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        write_test_pdf(&a, "A", 2);

        let out = dir.path().join("out.pdf");
        let source = PdfDocument::open(&a).unwrap();
        let mut output = PdfOutput::new();
        output.append_page(source.page(2).unwrap());
        output.append_page(source.page(1).unwrap());
        output.save(&out).unwrap();

        let doc = Document::load(&out).unwrap();
        let page_ids: Vec<_> = doc.get_pages().into_values().collect();
        for page_id in &page_ids {
            let page = doc.get_dictionary(*page_id).unwrap();
            assert!(page.has(b"Resources"));
            assert!(page.has(b"MediaBox"));
        }
        // The shared font is copied once
        let fonts = doc
            .objects
            .values()
            .filter(|obj| matches!(obj.type_name(), Ok(b"Font")))
            .count();
        assert_eq!(fonts, 1);
    }

    #[test]
    fn test_failed_save_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        write_test_pdf(&a, "A", 1);

        let source = PdfDocument::open(&a).unwrap();
        let mut output = PdfOutput::new();
        output.append_page(source.page(1).unwrap());

        let out = dir.path().join("missing-dir").join("out.pdf");
        let err = output.save(&out).unwrap_err();
        assert!(matches!(err, AssemblyError::Save { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_engine_operations_on_real_files() {
        use crate::assembly::source::{Selection, SourceDocument, SourceList, SplitJob};
        use crate::assembly::AssemblyEngine;

        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        write_test_pdf(&a, "A", 3);
        write_test_pdf(&b, "B", 5);

        let engine = AssemblyEngine::new(LopdfPort);
        let mut sources = SourceList::new();
        sources.add(SourceDocument::open(&LopdfPort, &a).unwrap()).unwrap();
        let mut second = SourceDocument::open(&LopdfPort, &b).unwrap();
        second.set_start(2);
        sources.add(second).unwrap();

        let merged = dir.path().join("merged.pdf");
        engine.merge(&sources, &merged).unwrap();
        assert_eq!(
            page_labels(&merged),
            vec!["A 1", "A 2", "A 3", "B 2", "B 3", "B 4", "B 5"]
        );

        let mixed = dir.path().join("mixed.pdf");
        engine.interleave(&sources, &mixed).unwrap();
        assert_eq!(
            page_labels(&mixed),
            vec!["A 1", "B 2", "A 2", "B 3", "A 3", "B 4", "B 5"]
        );

        let mut job = SplitJob::new(SourceDocument::open(&LopdfPort, &b).unwrap());
        job.add_extract(dir.path().join("head.pdf")).unwrap().set_end(3);
        job.add_extract(dir.path().join("tail.pdf")).unwrap().set_start(2);
        engine.split(&job).unwrap();
        assert_eq!(page_labels(&dir.path().join("head.pdf")), vec!["B 1", "B 2", "B 3"]);
        assert_eq!(
            page_labels(&dir.path().join("tail.pdf")),
            vec!["B 2", "B 3", "B 4", "B 5"]
        );

        let booklet = dir.path().join("b_2.pdf");
        let source = SourceDocument::open(&LopdfPort, &b).unwrap();
        engine.booklet_reorder(&source, &booklet).unwrap();
        assert_eq!(
            page_labels(&booklet),
            vec!["B 1", "B 5", "B 2", "B 4", "B 3"]
        );
    }

    #[test]
    fn test_decode_utf16_string() {
        let bytes = [0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(decode_pdf_string(&bytes).as_deref(), Some("Hi"));
        assert_eq!(decode_pdf_string(b"plain").as_deref(), Some("plain"));
    }
}
