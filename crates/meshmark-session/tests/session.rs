use anyhow::Result;
use meshmark_base::{HexColor, MeshId};
use meshmark_session::{AnnotationSession, SessionEvent};

fn id(name: &str) -> MeshId {
    MeshId::from(name)
}

#[test]
fn click_replaces_selection_and_is_idempotent() {
    let mut session = AnnotationSession::new();
    assert!(session.select("Body"));
    assert!(session.select("Wheel_L"));
    assert_eq!(session.selection(), Some(&id("Wheel_L")));

    assert!(!session.select("Wheel_L"));
    assert_eq!(session.selection(), Some(&id("Wheel_L")));
}

#[test]
fn click_on_empty_space_keeps_selection() {
    let mut session = AnnotationSession::new();
    assert!(!session.apply(SessionEvent::MeshClicked(None)));
    assert_eq!(session.selection(), None);

    session.select("Door");
    assert!(!session.apply(SessionEvent::MeshClicked(None)));
    assert_eq!(session.selection(), Some(&id("Door")));
}

#[test]
fn color_only_touches_selected_mesh() -> Result<()> {
    let mut session = AnnotationSession::new();
    session.select("Hood");
    session.set_color(HexColor::parse("#00ff00")?);
    session.select("Wheel_L");
    session.set_color(HexColor::parse("#ff0000")?);

    assert_eq!(session.color_of(&id("Wheel_L")).map(HexColor::as_str), Some("#ff0000"));
    assert_eq!(session.color_of(&id("Hood")).map(HexColor::as_str), Some("#00ff00"));
    assert_eq!(session.colors().len(), 2);
    Ok(())
}

#[test]
fn color_without_selection_is_ignored() -> Result<()> {
    let mut session = AnnotationSession::new();
    assert!(!session.set_color(HexColor::parse("#123456")?));
    assert!(session.colors().is_empty());
    Ok(())
}

#[test]
fn note_commits_to_selected_mesh() {
    let mut session = AnnotationSession::new();
    session.select("Wheel_L");
    let mut draft = session.begin_note().expect("selection exists");
    draft.text = "check tire".to_string();
    assert!(session.commit_note(draft));

    assert_eq!(session.note_of(&id("Wheel_L")), "check tire");
    assert_eq!(session.note_of(&id("Wheel_R")), "");
}

#[test]
fn note_goes_to_mesh_selected_when_editing_began() {
    let mut session = AnnotationSession::new();
    session.select("Wheel_L");
    let mut draft = session.begin_note().expect("selection exists");
    draft.text = "check tire".to_string();

    session.select("Wheel_R");
    session.commit_note(draft);

    assert_eq!(session.note_of(&id("Wheel_L")), "check tire");
    assert_eq!(session.note_of(&id("Wheel_R")), "");
    assert_eq!(session.selection(), Some(&id("Wheel_R")));
}

#[test]
fn begin_note_needs_selection_and_starts_from_existing_text() {
    let mut session = AnnotationSession::new();
    assert!(session.begin_note().is_none());

    session.select("Mirror");
    session.apply(SessionEvent::NoteCommitted {
        target: id("Mirror"),
        text: "cracked".to_string(),
    });
    let draft = session.begin_note().expect("selection exists");
    assert_eq!(draft.target(), &id("Mirror"));
    assert_eq!(draft.text, "cracked");
}

#[test]
fn panel_exists_exactly_when_selected() -> Result<()> {
    let mut session = AnnotationSession::new();
    assert!(session.panel().is_none());

    session.select("Wheel_L");
    let panel = session.panel().expect("panel visible");
    assert_eq!(panel.title(), "Editing: Wheel_L");
    assert_eq!(panel.color.as_str(), "#ffffff");
    assert_eq!(panel.note, "");

    session.set_color(HexColor::parse("#ff0000")?);
    let panel = session.panel().expect("panel visible");
    assert_eq!(panel.color.as_str(), "#ff0000");
    Ok(())
}

#[test]
fn display_color_falls_back_to_material_color() -> Result<()> {
    let mut session = AnnotationSession::new();
    let base = HexColor::parse("#808080")?;
    assert_eq!(session.display_color(&id("Body"), &base), &base);

    session.select("Body");
    session.set_color(HexColor::parse("#0000ff")?);
    assert_eq!(session.display_color(&id("Body"), &base).as_str(), "#0000ff");
    Ok(())
}
