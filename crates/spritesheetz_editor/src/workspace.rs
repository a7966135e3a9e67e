//! Tabbed workspace: open sheets and maps, files, commands and session state

use crate::input::{command_for_key, EditorCommand, Key, Modifiers, PointerEvent};
use crate::project::{self, ProjectError};
use crate::session::SessionState;
use crate::shell::{FileDialogs, Prompt, PropertyPanel, Shell, APP_TITLE, IMAGE_FILTER, PROJECT_FILTER};
use crate::surface::{MapSurface, SpriteSheetSurface};
use spritesheetz_core::{
    Document, DocumentKind, MapBrush, MapError, MapModel, ObjectEdit, ObjectError, Scene,
    SheetError, SpriteObject, SpriteSheetModel, DEFAULT_TILE_SIZE,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Sheet(#[from] SheetError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Object(#[from] ObjectError),
    #[error("No tab is open")]
    NoActiveTab,
    #[error("The active tab is not a {0}")]
    WrongTab(DocumentKind),
}

/// What [`Workspace::trigger_file`] did with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Attached to the active map at this sheet index
    Attached(usize),
    /// Opened in a tab
    Opened(Uuid),
    /// The user declined attaching it to the active map
    Declined,
}

/// Whether the editor should keep running after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}

#[derive(Debug)]
pub enum TabContent {
    Sheet(SpriteSheetSurface),
    Map(MapSurface),
}

/// One open editor tab with the scene it draws on
pub struct Tab<S> {
    id: Uuid,
    content: TabContent,
    scene: S,
    /// One scene per attached sheet palette (maps only)
    palette_scenes: Vec<S>,
}

impl<S: Scene> Tab<S> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        match &self.content {
            TabContent::Sheet(surface) => &surface.sheet().name,
            TabContent::Map(surface) => &surface.map().name,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match &self.content {
            TabContent::Sheet(_) => DocumentKind::Sheet,
            TabContent::Map(_) => DocumentKind::Map,
        }
    }

    pub fn content(&self) -> &TabContent {
        &self.content
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn palette_scene(&self, index: usize) -> Option<&S> {
        self.palette_scenes.get(index)
    }

    pub fn file_path(&self) -> Option<&Path> {
        match &self.content {
            TabContent::Sheet(surface) => surface.file_path(),
            TabContent::Map(surface) => surface.file_path(),
        }
    }

    fn set_file_path(&mut self, path: PathBuf) {
        match &mut self.content {
            TabContent::Sheet(surface) => surface.set_file_path(path),
            TabContent::Map(surface) => surface.set_file_path(path),
        }
    }

    pub fn to_document(&self) -> Document {
        match &self.content {
            TabContent::Sheet(surface) => Document::Sheet(surface.to_document()),
            TabContent::Map(surface) => Document::Map(surface.to_document()),
        }
    }

    fn set_grid_visible(&mut self, visible: bool) {
        match &mut self.content {
            TabContent::Sheet(surface) => surface.set_grid_visible(visible, &mut self.scene),
            TabContent::Map(surface) => {
                surface.set_grid_visible(visible, &mut self.scene);
                for (index, scene) in self.palette_scenes.iter_mut().enumerate() {
                    surface.set_palette_grid_visible(index, visible, scene);
                }
            }
        }
    }

    fn close(&mut self) {
        match &mut self.content {
            TabContent::Sheet(surface) => surface.close(&mut self.scene),
            TabContent::Map(surface) => surface.close(&mut self.scene),
        }
    }
}

/// Log a failed user action and show it to the user
fn report(prompt: &mut impl Prompt, context: &str, error: &WorkspaceError) {
    warn!("{}: {}", context, error);
    prompt.notify_error(APP_TITLE, &format!("{}: {}", context, error));
}

/// All open tabs. `S` is the scene implementation each tab draws on.
pub struct Workspace<S: Scene + Default> {
    tabs: Vec<Tab<S>>,
    active: Option<usize>,
    show_grid: bool,
    tile_size: (u32, u32),
}

impl<S: Scene + Default> Default for Workspace<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scene + Default> Workspace<S> {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
            show_grid: true,
            tile_size: (DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE),
        }
    }

    pub fn tabs(&self) -> &[Tab<S>] {
        &self.tabs
    }

    pub fn tab(&self, id: Uuid) -> Option<&Tab<S>> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&Tab<S>> {
        self.active.and_then(|index| self.tabs.get(index))
    }

    fn active_tab_mut(&mut self) -> Result<&mut Tab<S>, WorkspaceError> {
        self.active
            .and_then(|index| self.tabs.get_mut(index))
            .ok_or(WorkspaceError::NoActiveTab)
    }

    /// Make a tab the active one; `false` if there is no such tab
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.active = Some(index);
        true
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Tile size used when slicing new sprite sheets
    pub fn tile_size(&self) -> (u32, u32) {
        self.tile_size
    }

    pub fn set_tile_size(&mut self, width: u32, height: u32) {
        self.tile_size = (width, height);
    }

    fn push_tab(&mut self, content: TabContent, scene: S, palette_scenes: Vec<S>) -> Uuid {
        let id = Uuid::new_v4();
        self.tabs.push(Tab {
            id,
            content,
            scene,
            palette_scenes,
        });
        self.active = Some(self.tabs.len() - 1);
        id
    }

    /// Open an empty 50x50 map
    pub fn new_map(&mut self) -> Uuid {
        let mut scene = S::default();
        let surface = MapSurface::new(MapModel::default(), self.show_grid, &mut scene);
        info!("Created new map");
        self.push_tab(TabContent::Map(surface), scene, Vec::new())
    }

    /// Slice an image into a new sprite-sheet tab
    pub fn new_sheet_from_image(&mut self, path: &Path) -> Result<Uuid, WorkspaceError> {
        let (tile_width, tile_height) = self.tile_size;
        let sheet = SpriteSheetModel::load_from_image(path, tile_width, tile_height)?;
        let mut scene = S::default();
        let surface = SpriteSheetSurface::new(sheet, self.show_grid, &mut scene);
        Ok(self.push_tab(TabContent::Sheet(surface), scene, Vec::new()))
    }

    /// Ask for an image and open it as a new sprite sheet
    pub fn new_sheet(&mut self, shell: &mut (impl FileDialogs + Prompt + PropertyPanel)) -> Option<Uuid> {
        let path = shell.choose_open_target("Open Sprite Sheet Image", &IMAGE_FILTER)?;
        match self.new_sheet_from_image(&path) {
            Ok(id) => {
                if let Some(Tab {
                    content: TabContent::Sheet(surface),
                    ..
                }) = self.active_tab()
                {
                    shell.show_sheet_properties(&surface.sheet().properties());
                }
                Some(id)
            }
            Err(e) => {
                report(shell, "Could not load sprite sheet image", &e);
                None
            }
        }
    }

    /// Open a parsed document in a new tab. `project_file` is where it was
    /// read from, if anywhere.
    pub fn open_document(
        &mut self,
        document: &Document,
        project_file: Option<&Path>,
    ) -> Result<Uuid, WorkspaceError> {
        let mut scene = S::default();
        let (content, palette_scenes) = match document {
            Document::Sheet(sheet_document) => {
                let sheet = project::restore_sheet(sheet_document, project_file)?;
                let surface = SpriteSheetSurface::new(sheet, self.show_grid, &mut scene);
                (TabContent::Sheet(surface), Vec::new())
            }
            Document::Map(map_document) => {
                let map = project::restore_map(map_document, project_file)?;
                let mut palette_scenes: Vec<S> = map.sheets().iter().map(|_| S::default()).collect();
                let mut surface = MapSurface::new(map, self.show_grid, &mut scene);
                surface.draw_palettes(self.show_grid, &mut palette_scenes);
                (TabContent::Map(surface), palette_scenes)
            }
        };

        let id = self.push_tab(content, scene, palette_scenes);
        if let (Some(path), Ok(tab)) = (project_file, self.active_tab_mut()) {
            tab.set_file_path(path.to_path_buf());
        }
        info!("Opened {} '{}'", document.kind(), document.name());
        Ok(id)
    }

    /// Open a project file. A file already open in a tab just activates that tab.
    pub fn open_file(&mut self, path: &Path) -> Result<Uuid, WorkspaceError> {
        if let Some(index) = self.tabs.iter().position(|tab| tab.file_path() == Some(path)) {
            self.active = Some(index);
            return Ok(self.tabs[index].id);
        }
        let document = project::load_document(path)?;
        self.open_document(&document, Some(path))
    }

    /// Ask for a project file and open it
    pub fn open(&mut self, shell: &mut (impl FileDialogs + Prompt)) -> Option<Uuid> {
        let path = shell.choose_open_target("Open Project File", &PROJECT_FILTER)?;
        match self.open_file(&path) {
            Ok(id) => Some(id),
            Err(e) => {
                report(shell, "Could not open project file", &e);
                None
            }
        }
    }

    /// Activate a project file from the file browser.
    ///
    /// A sprite sheet triggered while a map is active is attached to that map
    /// after confirmation; anything else is opened in a tab.
    pub fn trigger_file(&mut self, path: &Path, prompt: &mut impl Prompt) -> Result<TriggerOutcome, WorkspaceError> {
        let document = project::load_document(path)?;
        let map_active = self
            .active_tab()
            .is_some_and(|tab| tab.kind() == DocumentKind::Map);

        if map_active && document.kind() == DocumentKind::Sheet {
            if !prompt.confirm(APP_TITLE, "Would you like to add this sheet to the map?") {
                return Ok(TriggerOutcome::Declined);
            }
            return self.attach_sheet_file(path).map(TriggerOutcome::Attached);
        }

        if let Some(index) = self.tabs.iter().position(|tab| tab.file_path() == Some(path)) {
            self.active = Some(index);
            return Ok(TriggerOutcome::Opened(self.tabs[index].id));
        }
        self.open_document(&document, Some(path)).map(TriggerOutcome::Opened)
    }

    /// Attach a sprite-sheet project file to the active map
    pub fn attach_sheet_file(&mut self, path: &Path) -> Result<usize, WorkspaceError> {
        let show_grid = self.show_grid;
        let tab = self.active_tab_mut()?;
        let TabContent::Map(surface) = &mut tab.content else {
            return Err(WorkspaceError::WrongTab(DocumentKind::Map));
        };

        let sheet = project::load_sheet(path)?;
        let mut palette_scene = S::default();
        let index = surface.attach_sheet(path, sheet, show_grid, &mut palette_scene)?;
        tab.palette_scenes.push(palette_scene);
        Ok(index)
    }

    /// Remove a sheet from the active map after confirmation. Returns the
    /// detached file, or `None` when the user declined.
    pub fn detach_sheet(&mut self, index: usize, prompt: &mut impl Prompt) -> Result<Option<PathBuf>, WorkspaceError> {
        let tab = self.active_tab_mut()?;
        let Tab {
            content,
            scene,
            palette_scenes,
            ..
        } = tab;
        let TabContent::Map(surface) = content else {
            return Err(WorkspaceError::WrongTab(DocumentKind::Map));
        };
        if index >= palette_scenes.len() {
            return Err(MapError::SheetOutOfRange(index).into());
        }
        if !prompt.confirm(APP_TITLE, "Are you sure you want to remove this sprite sheet from the map?") {
            return Ok(None);
        }

        let path = surface.detach_sheet(index, scene, &mut palette_scenes[index])?;
        palette_scenes.remove(index);
        Ok(Some(path))
    }

    /// Save the active tab. Without a file path yet, or with `save_as`, the
    /// user picks the target. Returns `None` if they cancelled.
    pub fn save_active(&mut self, dialogs: &mut impl FileDialogs, save_as: bool) -> Result<Option<PathBuf>, WorkspaceError> {
        let tab = self.active_tab_mut()?;
        let path = match tab.file_path() {
            Some(path) if !save_as => path.to_path_buf(),
            _ => {
                let title = match tab.kind() {
                    DocumentKind::Sheet => "Save Sprite Sheet",
                    DocumentKind::Map => "Save Map",
                };
                let Some(path) = dialogs.choose_save_target(title, &PROJECT_FILTER) else {
                    return Ok(None);
                };
                path
            }
        };

        project::save_document(&path, &tab.to_document())?;
        tab.set_file_path(path.clone());
        Ok(Some(path))
    }

    /// Close a tab after confirmation
    pub fn close_tab(&mut self, index: usize, prompt: &mut impl Prompt) -> bool {
        if index >= self.tabs.len() || !prompt.confirm(APP_TITLE, "Are you sure you want to close this tab?") {
            return false;
        }

        let mut tab = self.tabs.remove(index);
        tab.close();
        info!("Closed tab '{}'", tab.title());

        self.active = match self.active {
            _ if self.tabs.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) => Some(active.min(self.tabs.len() - 1)),
            None => None,
        };
        true
    }

    /// Flip grid lines on every tab
    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
        for tab in &mut self.tabs {
            tab.set_grid_visible(self.show_grid);
        }
    }

    /// Saved state of every open tab, in tab order
    pub fn tab_states(&self) -> Vec<Document> {
        self.tabs.iter().map(Tab::to_document).collect()
    }

    /// Reopen tabs from saved states. States that fail to restore are logged
    /// and skipped; returns how many tabs were opened.
    pub fn restore_tabs(&mut self, states: &[Document]) -> usize {
        states
            .iter()
            .filter(|state| match self.open_document(state, None) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Could not restore tab '{}': {}", state.name(), e);
                    false
                }
            })
            .count()
    }

    /// Store the workspace part of the session
    pub fn save_session(&self, session: &mut SessionState) {
        session.show_grid = self.show_grid;
        session.tabs = self.tab_states();
    }

    pub fn restore_session(&mut self, session: &SessionState) -> usize {
        self.show_grid = session.show_grid;
        self.restore_tabs(&session.tabs)
    }

    pub fn pointer_press(&mut self, event: &PointerEvent, panel: &mut impl PropertyPanel) {
        let Ok(tab) = self.active_tab_mut() else {
            return;
        };
        match &mut tab.content {
            TabContent::Sheet(surface) => {
                surface.pointer_press(event, &mut tab.scene, panel);
            }
            TabContent::Map(surface) => {
                surface.pointer_press(event, &mut tab.scene);
            }
        }
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, panel: &mut impl PropertyPanel) {
        let Ok(tab) = self.active_tab_mut() else {
            return;
        };
        match &mut tab.content {
            TabContent::Sheet(surface) => {
                surface.pointer_move(event, &mut tab.scene, panel);
            }
            TabContent::Map(surface) => {
                surface.pointer_move(event, &mut tab.scene);
            }
        }
    }

    pub fn pointer_release(&mut self, event: &PointerEvent) {
        let Ok(tab) = self.active_tab_mut() else {
            return;
        };
        match &mut tab.content {
            TabContent::Sheet(surface) => surface.pointer_release(event),
            TabContent::Map(surface) => surface.pointer_release(event),
        }
    }

    /// Pointer moved over a palette of the active map
    pub fn palette_pointer_move(&mut self, sheet: usize, x: f32, y: f32) {
        let Ok(tab) = self.active_tab_mut() else {
            return;
        };
        if let (TabContent::Map(surface), Some(scene)) = (&mut tab.content, tab.palette_scenes.get_mut(sheet)) {
            surface.palette_pointer_move(sheet, x, y, scene);
        }
    }

    /// Pick the active map's brush from one of its palettes
    pub fn palette_pick(&mut self, sheet: usize, x: f32, y: f32) -> Option<MapBrush> {
        let tab = self.active_tab_mut().ok()?;
        let TabContent::Map(surface) = &mut tab.content else {
            return None;
        };
        surface.palette_pick(sheet, x, y).cloned()
    }

    fn active_sheet(&mut self) -> Result<(&mut SpriteSheetSurface, &mut S), WorkspaceError> {
        let tab = self.active_tab_mut()?;
        match &mut tab.content {
            TabContent::Sheet(surface) => Ok((surface, &mut tab.scene)),
            TabContent::Map(_) => Err(WorkspaceError::WrongTab(DocumentKind::Sheet)),
        }
    }

    /// Whether the "Tile/s to object" context action applies at a position of the active sheet
    pub fn context_action_available(&self, x: f32, y: f32) -> bool {
        match self.active_tab().map(Tab::content) {
            Some(TabContent::Sheet(surface)) => surface.can_group_at(x, y),
            _ => false,
        }
    }

    /// Group the active sheet's selection into an object
    pub fn tiles_to_object(&mut self, panel: &mut impl PropertyPanel) -> Result<String, WorkspaceError> {
        let (surface, scene) = self.active_sheet()?;
        Ok(surface.tiles_to_object(scene, panel)?)
    }

    pub fn apply_object_edit(
        &mut self,
        key: &str,
        edit: ObjectEdit,
        panel: &mut impl PropertyPanel,
    ) -> Result<(), WorkspaceError> {
        let (surface, _) = self.active_sheet()?;
        Ok(surface.apply_object_edit(key, edit, panel)?)
    }

    pub fn remove_object(&mut self, key: &str, panel: &mut impl PropertyPanel) -> Result<Option<SpriteObject>, WorkspaceError> {
        let (surface, scene) = self.active_sheet()?;
        Ok(surface.remove_object(key, scene, panel))
    }

    pub fn set_sheet_name(&mut self, name: &str, panel: &mut impl PropertyPanel) -> Result<(), WorkspaceError> {
        let (surface, _) = self.active_sheet()?;
        surface.set_sheet_name(name, panel);
        Ok(())
    }

    /// Delete the selection of the active tab
    pub fn delete_selection(&mut self, panel: &mut impl PropertyPanel) {
        let Ok(tab) = self.active_tab_mut() else {
            return;
        };
        match &mut tab.content {
            TabContent::Sheet(surface) => {
                surface.delete_press(&mut tab.scene, panel);
            }
            TabContent::Map(surface) => {
                surface.delete_press(&mut tab.scene);
            }
        }
    }

    fn clear_selection(&mut self, panel: &mut impl PropertyPanel) {
        let Ok(tab) = self.active_tab_mut() else {
            return;
        };
        match &mut tab.content {
            TabContent::Sheet(surface) => surface.clear_selection(&mut tab.scene, panel),
            TabContent::Map(surface) => surface.clear_selection(&mut tab.scene),
        }
    }

    /// Run an editor command, reporting failures through the shell
    pub fn execute(&mut self, command: EditorCommand, shell: &mut impl Shell) -> CommandOutcome {
        match command {
            EditorCommand::NewMap => {
                self.new_map();
            }
            EditorCommand::NewSpriteSheet => {
                self.new_sheet(shell);
            }
            EditorCommand::Open => {
                self.open(shell);
            }
            EditorCommand::Save | EditorCommand::SaveAs => {
                let save_as = command == EditorCommand::SaveAs;
                if let Err(e) = self.save_active(shell, save_as) {
                    report(shell, "Could not save", &e);
                }
            }
            EditorCommand::Exit => {
                if shell.confirm(APP_TITLE, "Are you sure you want to exit?") {
                    return CommandOutcome::Exit;
                }
            }
            EditorCommand::DeleteSelection => self.delete_selection(shell),
            EditorCommand::ClearSelection => self.clear_selection(shell),
            EditorCommand::ToggleGrid => self.toggle_grid(),
        }
        CommandOutcome::Continue
    }

    /// Run the command bound to a key, if any
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers, shell: &mut impl Shell) -> CommandOutcome {
        match command_for_key(key, modifiers) {
            Some(command) => self.execute(command, shell),
            None => CommandOutcome::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerButton;
    use crate::shell::testing::ScriptedShell;
    use image::RgbaImage;
    use spritesheetz_core::coord::{MAP_CELL_PITCH, SHEET_CELL_PITCH};
    use spritesheetz_core::{Brush, CellCoord, RecordedScene};

    type TestWorkspace = Workspace<RecordedScene>;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spritesheetz_workspace_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_image(dir: &Path) -> PathBuf {
        let path = dir.join("tiles.png");
        RgbaImage::new(48, 32).save(&path).unwrap();
        path
    }

    fn click(workspace: &mut TestWorkspace, shell: &mut ScriptedShell, col: u32, row: u32, pitch: f32) {
        let event = PointerEvent::button(col as f32 * pitch + 5.0, row as f32 * pitch + 5.0, PointerButton::Left);
        workspace.pointer_press(&event, shell);
        workspace.pointer_release(&event);
    }

    /// Sheet tab with one grouped object, saved to `dir/tiles.json`
    fn saved_sheet(workspace: &mut TestWorkspace, shell: &mut ScriptedShell, dir: &Path) -> PathBuf {
        workspace.new_sheet_from_image(&write_image(dir)).unwrap();
        click(workspace, shell, 0, 0, SHEET_CELL_PITCH);
        click(workspace, shell, 0, 1, SHEET_CELL_PITCH);
        workspace.tiles_to_object(shell).unwrap();

        let path = dir.join("tiles.json");
        shell.save_targets.push_back(path.clone());
        assert_eq!(workspace.save_active(shell, false).unwrap(), Some(path.clone()));
        path
    }

    #[test]
    fn test_new_map_tab() {
        let mut workspace = TestWorkspace::new();
        let id = workspace.new_map();
        let tab = workspace.active_tab().unwrap();
        assert_eq!(tab.id(), id);
        assert_eq!(tab.title(), "Untitled map");
        assert_eq!(tab.kind(), DocumentKind::Map);
        assert_eq!(tab.scene().line_count(), 102);
    }

    #[test]
    fn test_new_sheet_via_dialog() {
        let dir = temp_dir();
        let mut workspace = TestWorkspace::new();
        let mut shell = ScriptedShell::default();
        shell.open_targets.push_back(write_image(&dir));

        assert!(workspace.new_sheet(&mut shell).is_some());
        let properties = shell.shown_sheet.clone().unwrap();
        assert_eq!((properties.horizontal_tiles, properties.vertical_tiles), (3, 2));

        // Cancelled dialog
        assert!(workspace.new_sheet(&mut shell).is_none());

        // Missing image is reported, not opened
        shell.open_targets.push_back(dir.join("missing.png"));
        assert!(workspace.new_sheet(&mut shell).is_none());
        assert_eq!(shell.errors.len(), 1);
        assert_eq!(workspace.tabs().len(), 1);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_save_then_reopen_sheet() {
        let dir = temp_dir();
        let mut workspace = TestWorkspace::new();
        let mut shell = ScriptedShell::default();
        let path = saved_sheet(&mut workspace, &mut shell, &dir);

        // Second save goes to the same file without asking
        assert_eq!(workspace.save_active(&mut shell, false).unwrap(), Some(path.clone()));

        // Opening an already open file activates its tab
        let first = workspace.tabs()[0].id();
        workspace.new_map();
        assert_eq!(workspace.open_file(&path).unwrap(), first);
        assert_eq!(workspace.active_index(), Some(0));

        let mut other = TestWorkspace::new();
        other.open_file(&path).unwrap();
        let Some(TabContent::Sheet(surface)) = other.active_tab().map(Tab::content) else {
            panic!("Expected sheet tab");
        };
        assert_eq!(surface.sheet().objects().len(), 1);
        assert_eq!(surface.file_path(), Some(path.as_path()));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_save_cancelled() {
        let mut workspace = TestWorkspace::new();
        let mut shell = ScriptedShell::default();
        workspace.new_map();
        assert_eq!(workspace.save_active(&mut shell, false).unwrap(), None);
        assert!(workspace.active_tab().unwrap().file_path().is_none());
    }

    #[test]
    fn test_trigger_sheet_on_map_attaches_after_confirm() {
        let dir = temp_dir();
        let mut workspace = TestWorkspace::new();
        let mut shell = ScriptedShell::default();
        let sheet_path = saved_sheet(&mut workspace, &mut shell, &dir);

        workspace.new_map();
        shell.answers.extend([false, true]);
        assert_eq!(
            workspace.trigger_file(&sheet_path, &mut shell).unwrap(),
            TriggerOutcome::Declined
        );
        assert_eq!(
            workspace.trigger_file(&sheet_path, &mut shell).unwrap(),
            TriggerOutcome::Attached(0)
        );
        let tab = workspace.active_tab().unwrap();
        assert_eq!(tab.palette_scene(0).unwrap().image_count(), 6);

        // Attaching the same file again is rejected
        shell.answers.push_back(true);
        assert!(matches!(
            workspace.trigger_file(&sheet_path, &mut shell),
            Err(WorkspaceError::Map(MapError::SheetAlreadyAttached(_)))
        ));

        // Pick the object from the palette and paint it
        let brush = workspace.palette_pick(0, 5.0, 5.0);
        assert_eq!(
            brush,
            Some(MapBrush::Object {
                sheet: 0,
                key: "object_1".to_string()
            })
        );
        click(&mut workspace, &mut shell, 3, 3, MAP_CELL_PITCH);
        let tab = workspace.active_tab().unwrap();
        assert_eq!(tab.scene().image_count(), 2);

        // Detach after confirmation clears the painted cells
        shell.answers.push_back(true);
        assert_eq!(workspace.detach_sheet(0, &mut shell).unwrap(), Some(sheet_path.clone()));
        let tab = workspace.active_tab().unwrap();
        assert_eq!(tab.scene().image_count(), 0);
        assert!(tab.palette_scene(0).is_none());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_trigger_without_map_opens() {
        let dir = temp_dir();
        let mut workspace = TestWorkspace::new();
        let mut shell = ScriptedShell::default();
        let sheet_path = saved_sheet(&mut workspace, &mut shell, &dir);

        let mut fresh = TestWorkspace::new();
        assert!(matches!(
            fresh.trigger_file(&sheet_path, &mut shell).unwrap(),
            TriggerOutcome::Opened(_)
        ));
        assert!(shell.questions.is_empty());
        assert_eq!(fresh.tabs().len(), 1);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_close_tab_needs_confirmation() {
        let mut workspace = TestWorkspace::new();
        let mut shell = ScriptedShell::answering(&[false, true]);
        workspace.new_map();
        workspace.new_map();

        assert!(!workspace.close_tab(0, &mut shell));
        assert_eq!(workspace.tabs().len(), 2);
        assert!(workspace.close_tab(0, &mut shell));
        assert_eq!(workspace.tabs().len(), 1);
        assert_eq!(workspace.active_index(), Some(0));
        assert!(!workspace.close_tab(5, &mut shell));
    }

    #[test]
    fn test_toggle_grid_applies_to_all_tabs() {
        let mut workspace = TestWorkspace::new();
        workspace.new_map();
        workspace.new_map();
        workspace.toggle_grid();
        assert!(!workspace.show_grid());
        assert!(workspace.tabs().iter().all(|tab| tab.scene().line_count() == 0));

        // New tabs follow the setting
        workspace.new_map();
        assert_eq!(workspace.active_tab().unwrap().scene().line_count(), 0);
    }

    #[test]
    fn test_session_round_trip() {
        let dir = temp_dir();
        let mut workspace = TestWorkspace::new();
        let mut shell = ScriptedShell::default();
        saved_sheet(&mut workspace, &mut shell, &dir);
        workspace.new_map();
        click(&mut workspace, &mut shell, 1, 1, MAP_CELL_PITCH);

        let mut session = SessionState::default();
        workspace.save_session(&mut session);
        assert_eq!(session.tabs.len(), 2);

        let mut restored = TestWorkspace::new();
        assert_eq!(restored.restore_session(&session), 2);
        assert_eq!(restored.tab_states(), session.tabs);
        assert_eq!(restored.tabs()[1].scene().rects(Brush::TileFill).len(), 1);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_restore_skips_broken_tabs() {
        let mut workspace = TestWorkspace::new();
        let mut broken = SpriteSheetModel::from_image(
            "/definitely/not/here.png",
            &image::DynamicImage::ImageRgba8(RgbaImage::new(16, 16)),
            16,
            16,
        )
        .unwrap()
        .to_document();
        broken.name = "Broken".to_string();
        let states = vec![
            Document::Sheet(broken),
            Document::Map(MapModel::new("World").to_document()),
        ];
        assert_eq!(workspace.restore_tabs(&states), 1);
        assert_eq!(workspace.active_tab().unwrap().title(), "World");
    }

    #[test]
    fn test_key_commands() {
        let dir = temp_dir();
        let mut workspace = TestWorkspace::new();
        let mut shell = ScriptedShell::default();
        workspace.new_sheet_from_image(&write_image(&dir)).unwrap();

        click(&mut workspace, &mut shell, 1, 1, SHEET_CELL_PITCH);
        workspace.handle_key(Key::Delete, Modifiers::NONE, &mut shell);
        let Some(TabContent::Sheet(surface)) = workspace.active_tab().map(Tab::content) else {
            panic!("Expected sheet tab");
        };
        assert!(!surface.sheet().tiles().is_occupied(CellCoord::new(1, 1)));

        // Ctrl+S with the save dialog cancelled does nothing
        assert_eq!(
            workspace.handle_key(Key::Char('s'), Modifiers::CONTROL, &mut shell),
            CommandOutcome::Continue
        );
        assert!(shell.errors.is_empty());

        shell.answers.extend([false, true]);
        assert_eq!(
            workspace.handle_key(Key::Char('e'), Modifiers::CONTROL, &mut shell),
            CommandOutcome::Continue
        );
        assert_eq!(
            workspace.handle_key(Key::Char('e'), Modifiers::CONTROL, &mut shell),
            CommandOutcome::Exit
        );

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_sheet_operations_need_sheet_tab() {
        let mut workspace = TestWorkspace::new();
        let mut shell = ScriptedShell::default();
        assert!(matches!(
            workspace.tiles_to_object(&mut shell),
            Err(WorkspaceError::NoActiveTab)
        ));
        workspace.new_map();
        assert!(matches!(
            workspace.set_sheet_name("x", &mut shell),
            Err(WorkspaceError::WrongTab(DocumentKind::Sheet))
        ));
        assert!(!workspace.context_action_available(5.0, 5.0));
    }

    #[test]
    fn test_object_edits_through_workspace() {
        let dir = temp_dir();
        let mut workspace = TestWorkspace::new();
        let mut shell = ScriptedShell::default();
        saved_sheet(&mut workspace, &mut shell, &dir);

        assert!(workspace.context_action_available(5.0, 5.0));
        workspace
            .apply_object_edit("object_1", ObjectEdit::Key("tree".to_string()), &mut shell)
            .unwrap();
        workspace.set_sheet_name("Forest", &mut shell).unwrap();
        assert_eq!(workspace.active_tab().unwrap().title(), "Forest");

        let removed = workspace.remove_object("tree", &mut shell).unwrap();
        assert_eq!(removed.map(|object| object.tiles.len()), Some(2));

        std::fs::remove_dir_all(dir).ok();
    }
}
