use meshmark_base::{HexColor, MeshId};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub type ColorMap = BTreeMap<MeshId, HexColor>;
pub type NoteMap = BTreeMap<MeshId, String>;

/// Everything the session reacts to. All state changes go through
/// [`AnnotationSession::apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Pointer click; `None` when the click hit empty space.
    MeshClicked(Option<MeshId>),
    /// Color picker change, applied to the current selection.
    ColorPicked(HexColor),
    /// Note text committed when the text area lost focus.
    NoteCommitted { target: MeshId, text: String },
}

/// Note text being edited, bound to the mesh that was selected when editing began.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteDraft {
    target: MeshId,
    pub text: String,
}

impl NoteDraft {
    pub fn target(&self) -> &MeshId {
        &self.target
    }

    pub fn into_event(self) -> SessionEvent {
        SessionEvent::NoteCommitted {
            target: self.target,
            text: self.text,
        }
    }
}

/// Snapshot of what the edit panel shows for the current selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditPanel {
    pub mesh: MeshId,
    pub color: HexColor,
    pub note: String,
}

impl EditPanel {
    pub fn title(&self) -> String {
        format!("Editing: {}", self.mesh)
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnnotationSession {
    selection: Option<MeshId>,
    colors: ColorMap,
    notes: NoteMap,
}

impl AnnotationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&MeshId> {
        self.selection.as_ref()
    }

    pub fn colors(&self) -> &ColorMap {
        &self.colors
    }

    pub fn notes(&self) -> &NoteMap {
        &self.notes
    }

    pub fn color_of(&self, mesh: &MeshId) -> Option<&HexColor> {
        self.colors.get(mesh)
    }

    pub fn note_of(&self, mesh: &MeshId) -> &str {
        self.notes.get(mesh).map(String::as_str).unwrap_or("")
    }

    /// Returns true when the event changed the session.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::MeshClicked(Some(mesh)) => {
                if self.selection.as_ref() == Some(&mesh) {
                    return false;
                }
                info!(mesh = %mesh, "mesh selected");
                self.selection = Some(mesh);
                true
            }
            SessionEvent::MeshClicked(None) => false,
            SessionEvent::ColorPicked(color) => {
                let Some(mesh) = self.selection.clone() else {
                    debug!(color = %color, "color ignored without selection");
                    return false;
                };
                if self.colors.get(&mesh) == Some(&color) {
                    return false;
                }
                info!(mesh = %mesh, color = %color, "mesh color assigned");
                self.colors.insert(mesh, color);
                true
            }
            SessionEvent::NoteCommitted { target, text } => {
                if self.note_of(&target) == text {
                    return false;
                }
                info!(mesh = %target, len = text.len(), "mesh note committed");
                self.notes.insert(target, text);
                true
            }
        }
    }

    pub fn select(&mut self, mesh: impl Into<MeshId>) -> bool {
        self.apply(SessionEvent::MeshClicked(Some(mesh.into())))
    }

    pub fn set_color(&mut self, color: HexColor) -> bool {
        self.apply(SessionEvent::ColorPicked(color))
    }

    /// Starts editing the note of the current selection.
    pub fn begin_note(&self) -> Option<NoteDraft> {
        let target = self.selection.clone()?;
        let text = self.note_of(&target).to_string();
        Some(NoteDraft { target, text })
    }

    pub fn commit_note(&mut self, draft: NoteDraft) -> bool {
        self.apply(draft.into_event())
    }

    /// `None` exactly when nothing is selected.
    pub fn panel(&self) -> Option<EditPanel> {
        let mesh = self.selection.clone()?;
        let color = self.colors.get(&mesh).cloned().unwrap_or_default();
        let note = self.note_of(&mesh).to_string();
        Some(EditPanel { mesh, color, note })
    }

    /// Assigned color, or `fallback` when the mesh has none.
    pub fn display_color<'a>(&'a self, mesh: &MeshId, fallback: &'a HexColor) -> &'a HexColor {
        self.colors.get(mesh).unwrap_or(fallback)
    }
}
