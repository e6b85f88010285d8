//! Command implementations.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use emojiart_core::drop_target::image_url;
use emojiart_core::emoji;
use emojiart_core::{
    Background, Document, DocumentLibrary, EditorConfig, EditorSession, FetchStatus, InputEvent,
    PaletteStore, Size,
};
use emojiart_runtime::{Autosave, Editor, HttpImageLoader};
use url::Url;

/// Palette store name used by the CLI.
const PALETTE_STORE: &str = "default";

/// Parse a `WIDTHxHEIGHT` viewport.
pub fn parse_viewport(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width: f64 = w.trim().parse().map_err(|_| format!("bad width {w:?}"))?;
    let height: f64 = h.trim().parse().map_err(|_| format!("bad height {h:?}"))?;
    let size = Size::new(width, height);
    if !size.is_positive() {
        return Err(format!("viewport must be positive, got {s}"));
    }
    Ok(size)
}

/// Parse a replay script: a JSON array of input events.
pub fn parse_script(json: &str) -> anyhow::Result<Vec<InputEvent>> {
    serde_json::from_str(json).context("script must be a JSON array of input events")
}

/// Interpret a background argument as a remote URL or a local file.
pub fn background_from_source(source: &str) -> anyhow::Result<Background> {
    if let Ok(url) = Url::parse(source) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(Background::Url(image_url(url)));
        }
    }
    let bytes = std::fs::read(source).with_context(|| format!("read image '{source}'"))?;
    if bytes.is_empty() {
        anyhow::bail!("image file '{source}' is empty");
    }
    Ok(Background::ImageData(bytes))
}

/// Shared state for every command.
#[derive(Debug)]
pub struct Context {
    library: DocumentLibrary,
    data_dir: PathBuf,
    viewport: Size,
    config: EditorConfig,
}

impl Context {
    pub fn new(data_dir: PathBuf, viewport: Size) -> anyhow::Result<Self> {
        let library = DocumentLibrary::open(&data_dir)
            .with_context(|| format!("open data dir '{}'", data_dir.display()))?;
        Ok(Self {
            library,
            data_dir,
            viewport,
            config: EditorConfig::from_env(),
        })
    }

    fn load(&self, name: &str) -> anyhow::Result<Document> {
        self.library
            .load(name)
            .with_context(|| format!("load document '{name}'"))
    }

    fn save(&self, name: &str, document: &Document) -> anyhow::Result<()> {
        let path = self
            .library
            .save(name, document)
            .with_context(|| format!("save document '{name}'"))?;
        eprintln!("wrote {}", path.display());
        Ok(())
    }

    fn session(&self, document: Document) -> EditorSession {
        EditorSession::open(document, self.viewport, self.config.clone())
    }

    fn editor(&self, document: Document) -> anyhow::Result<Editor<HttpImageLoader>> {
        let loader = HttpImageLoader::new().context("build HTTP client")?;
        Ok(Editor::new(self.session(document), loader))
    }

    pub fn new_document(&self, name: &str, force: bool) -> anyhow::Result<()> {
        if !force && self.library.path_for(name).exists() {
            anyhow::bail!("document '{name}' already exists (use --force to replace it)");
        }
        self.save(name, &Document::new())
    }

    pub fn show(&self, name: &str, json: bool) -> anyhow::Result<()> {
        let document = self.load(name)?;
        if json {
            println!("{}", document.to_json()?);
        } else {
            print!("{}", summary(&document));
        }
        Ok(())
    }

    pub fn add(&self, name: &str, text: &str, at: (i32, i32), size: i32) -> anyhow::Result<()> {
        if emoji::first_character(text) != Some(text) || !emoji::is_emoji(text) {
            anyhow::bail!("{text:?} is not a single emoji");
        }
        let mut session = self.session(self.load(name)?);
        let id = session
            .add_item(text, at, size)
            .context("item was not added")?;
        tracing::info!(%id, "item added");
        self.save(name, session.document())
    }

    pub async fn background(&self, name: &str, source: &str, fetch: bool) -> anyhow::Result<()> {
        let background = background_from_source(source)?;
        let document = self.load(name)?;
        if !fetch {
            let mut session = self.session(document);
            session.set_background(background);
            return self.save(name, session.document());
        }

        let mut editor = self.editor(document)?;
        editor.update(|s| s.set_background(background));
        editor.settle().await;
        report_fetch(editor.session());
        self.save(name, editor.session().document())
    }

    pub async fn replay(&self, name: &str, script: &Path, create: bool) -> anyhow::Result<()> {
        let json = std::fs::read_to_string(script)
            .with_context(|| format!("read script '{}'", script.display()))?;
        let events = parse_script(&json)?;

        let document = if create && !self.library.path_for(name).exists() {
            Document::new()
        } else {
            self.load(name)?
        };

        let mut editor = self.editor(document)?;
        let autosave = Autosave::spawn(self.library.clone(), name, self.config.autosave_debounce);
        editor.update(|session| autosave.attach(session));
        autosave.changed(editor.session().document())?;

        editor.settle().await;
        for event in &events {
            editor.handle_event(event);
            // Zoom-to-fit needs the decoded image, so settle between events.
            editor.settle().await;
        }
        tracing::info!(events = events.len(), "replay finished");

        let session = editor.session();
        report_fetch(session);
        if let Some(description) = session.undo_description() {
            eprintln!("last action: {description}");
        }
        autosave
            .shutdown()
            .await
            .with_context(|| format!("save document '{name}'"))?;
        eprintln!("wrote {}", self.library.path_for(name).display());
        print!("{}", summary(editor.session().document()));
        Ok(())
    }

    pub fn list(&self) -> anyhow::Result<()> {
        for name in self.library.list()? {
            println!("{name}");
        }
        Ok(())
    }

    pub fn delete(&self, name: &str) -> anyhow::Result<()> {
        if !self.library.delete(name)? {
            anyhow::bail!("document '{name}' does not exist");
        }
        Ok(())
    }

    pub fn palettes(&self) -> anyhow::Result<PaletteStore> {
        PaletteStore::with_data_dir(PALETTE_STORE, &self.data_dir).context("open palette store")
    }
}

fn report_fetch(session: &EditorSession) {
    match session.fetch_status() {
        FetchStatus::Failed(source) => eprintln!("could not load background from {source}"),
        FetchStatus::Idle | FetchStatus::Fetching => {
            if let Some(image) = session.background_image() {
                eprintln!("background {}x{}", image.width, image.height);
            }
        }
    }
}

/// Human-readable description of a document.
pub fn summary(document: &Document) -> String {
    let mut out = String::new();
    let background = match document.background() {
        Background::Blank => "blank".to_string(),
        Background::Url(url) => url.to_string(),
        Background::ImageData(data) => format!("inline image ({} bytes)", data.len()),
    };
    out.push_str(&format!("background: {background}\n"));
    out.push_str(&format!("items: {}\n", document.len()));
    for item in document.items() {
        out.push_str(&format!(
            "  #{} {} at ({}, {}) size {}\n",
            item.id(),
            item.text,
            item.x,
            item.y,
            item.size
        ));
    }
    out
}

pub fn print_palettes(store: &PaletteStore) {
    for (index, palette) in store.palettes().iter().enumerate() {
        println!("{index:>2} {:<12} {}", palette.name, palette.emojis);
    }
}
