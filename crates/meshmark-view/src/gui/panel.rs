use meshmark_base::HexColor;
use meshmark_session::{AnnotationSession, EditPanel, NoteDraft, SessionEvent};

const PANEL_MARGIN: f32 = 20.0;

/// Text area state of the edit panel.
///
/// The mesh a note belongs to is captured when the text area takes focus,
/// so a note typed for one mesh is never filed under a later selection.
#[derive(Default)]
pub struct NoteEditor {
    draft: Option<NoteDraft>,
    buffer: String,
}

impl NoteEditor {
    /// Mirrors the session's note while idle. A draft for a mesh other than
    /// the panel's is committed to its own mesh first.
    pub fn sync(&mut self, panel: &EditPanel) -> Option<SessionEvent> {
        let retargeted = self
            .draft
            .as_ref()
            .is_some_and(|draft| draft.target() != &panel.mesh);
        let event = if retargeted { self.finish() } else { None };
        if self.draft.is_none() {
            self.buffer.clone_from(&panel.note);
        }
        event
    }

    pub fn begin(&mut self, session: &AnnotationSession) {
        if self.draft.is_none() {
            self.draft = session.begin_note();
        }
    }

    pub fn finish(&mut self) -> Option<SessionEvent> {
        let mut draft = self.draft.take()?;
        draft.text = self.buffer.clone();
        Some(draft.into_event())
    }

    pub fn buffer_mut(&mut self) -> &mut String {
        &mut self.buffer
    }
}

/// Draws the edit panel when something is selected and returns the edits made.
pub fn show_edit_panel(
    ctx: &egui::Context,
    session: &AnnotationSession,
    editor: &mut NoteEditor,
) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    let Some(panel) = session.panel() else {
        events.extend(editor.finish());
        return events;
    };
    events.extend(editor.sync(&panel));

    egui::Window::new("Edit")
        .id(egui::Id::new("edit_panel"))
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-PANEL_MARGIN, PANEL_MARGIN))
        .show(ctx, |ui| {
            ui.heading(panel.title());

            ui.horizontal(|ui| {
                ui.label("Color");
                let mut rgb = panel.color.rgb();
                if ui.color_edit_button_srgb(&mut rgb).changed() {
                    events.push(SessionEvent::ColorPicked(HexColor::from_rgb(
                        rgb[0], rgb[1], rgb[2],
                    )));
                }
                ui.monospace(panel.color.as_str());
            });

            let response = ui.add(
                egui::TextEdit::multiline(editor.buffer_mut())
                    .hint_text("Add note here...")
                    .desired_rows(4),
            );
            if response.has_focus() {
                editor.begin(session);
            }
            if response.lost_focus() {
                events.extend(editor.finish());
            }

            ui.label(format!("Note: {}", panel.note));
        });

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshmark_base::MeshId;

    fn commit(session: &mut AnnotationSession, event: Option<SessionEvent>) {
        if let Some(event) = event {
            session.apply(event);
        }
    }

    #[test]
    fn blur_commits_typed_text_to_selected_mesh() {
        let mut session = AnnotationSession::new();
        let mut editor = NoteEditor::default();
        session.select("Wheel_L");

        let panel = session.panel().expect("panel");
        assert!(editor.sync(&panel).is_none());
        editor.begin(&session);
        editor.buffer_mut().push_str("check tire");
        let event = editor.finish();
        commit(&mut session, event);

        assert_eq!(session.note_of(&MeshId::from("Wheel_L")), "check tire");
    }

    #[test]
    fn selection_change_mid_edit_keeps_note_on_original_mesh() {
        let mut session = AnnotationSession::new();
        let mut editor = NoteEditor::default();
        session.select("Wheel_L");
        editor.sync(&session.panel().expect("panel"));
        editor.begin(&session);
        editor.buffer_mut().push_str("check tire");

        session.select("Wheel_R");
        let event = editor.sync(&session.panel().expect("panel"));
        commit(&mut session, event);

        assert_eq!(session.note_of(&MeshId::from("Wheel_L")), "check tire");
        assert_eq!(session.note_of(&MeshId::from("Wheel_R")), "");
        assert_eq!(editor.buffer_mut().as_str(), "");
        assert!(editor.finish().is_none());
    }

    #[test]
    fn idle_editor_mirrors_committed_note() {
        let mut session = AnnotationSession::new();
        let mut editor = NoteEditor::default();
        session.select("Mirror");
        session.apply(SessionEvent::NoteCommitted {
            target: MeshId::from("Mirror"),
            text: "cracked".to_string(),
        });

        editor.sync(&session.panel().expect("panel"));
        assert_eq!(editor.buffer_mut().as_str(), "cracked");
    }
}
