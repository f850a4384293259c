//! End-to-end builder session tests
//!
//! These tests drive a session the way a host page would:
//! - Dragging fields from the sidebar onto the document
//! - Receiving position and click messages from the viewer
//! - Uploading a PDF through a fake transport

use pdf_builder::bridge::message::{ADD_ELEMENT, FORM};
use pdf_builder::dropzone::CssLength;
use pdf_builder::error::{BuilderError, Result};
use pdf_builder::upload::{PDF_SERVER_NOT_SET, UPLOAD_FAILED};
use pdf_builder::{
    bridge_pair, BridgeEndpoint, BridgeMessage, BuilderEvent, BuilderOptions, BuilderSession,
    BuilderView, ComponentNode, DropEvent, DropTarget, Envelope, FormSchema, InputEvent, Overlay,
    PdfSettings, PdfViewer, Rect, UploadFile, UploadOutcome, UploadResponse, UploadTransport,
    ViewerContainer,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

/// Transport answering every request with the same response
struct FakeTransport {
    response: Option<UploadResponse>,
    calls: AtomicUsize,
    last_url: Mutex<Option<String>>,
}

impl FakeTransport {
    fn answering(status: u16, status_text: &str, body: &str) -> Self {
        Self {
            response: Some(UploadResponse {
                status,
                status_text: status_text.to_string(),
                body: body.to_string(),
            }),
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        }
    }

    fn unreachable() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UploadTransport for FakeTransport {
    async fn post_file(&self, url: &str, _file: &UploadFile) -> Result<UploadResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.to_string());
        self.response
            .clone()
            .ok_or_else(|| BuilderError::Transport("connection refused".to_string()))
    }
}

fn pdf_form() -> FormSchema {
    let mut form = FormSchema::pdf();
    form.settings.pdf = Some(PdfSettings {
        id: "doc".to_string(),
        src: "/api/pdf/doc".to_string(),
    });
    form
}

fn sample_pdf() -> UploadFile {
    UploadFile::pdf("sample.pdf", b"%PDF-1.7\n%%EOF".to_vec())
}

/// Attached editor session plus the viewer's end of the bridge
fn editor_session(form: FormSchema) -> (BuilderSession, BridgeEndpoint) {
    let (builder_end, viewer_end) = bridge_pair();
    let mut session =
        BuilderSession::with_viewer(BuilderOptions::new(), PdfViewer::new(builder_end));
    session.set_form(form).unwrap();
    session.attach();
    session.on_viewer_attach(ViewerContainer::new(1).with_rect(Rect::from_size(612.0, 792.0)));
    (session, viewer_end)
}

fn drain_events(events: &mut UnboundedReceiver<BuilderEvent>) -> Vec<BuilderEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

#[test]
fn test_drop_textfield_end_to_end() -> Result<()> {
    let (mut session, mut viewer) = editor_session(pdf_form());
    viewer.drain();
    let mut events = session.subscribe();

    session.on_drag_start("textfield");
    session.on_dropzone_drop(DropEvent::on_dropzone(15.0, 40.0));
    let node = session.on_drag_end(Some("textfield"))?.unwrap();

    let overlay = node.overlay.unwrap();
    assert_eq!(overlay.top, 40.0);
    assert_eq!(overlay.left, 15.0);
    assert_eq!(overlay.width, 100.0);
    assert_eq!(overlay.height, 20.0);
    assert_eq!(node.key, "textField");
    assert!(!node.id.is_empty());

    assert_eq!(session.form().components, vec![node.clone()]);

    let received = drain_events(&mut events);
    assert_eq!(received, vec![BuilderEvent::AddComponent(node.clone())]);

    let envelopes = viewer.drain();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].name, ADD_ELEMENT);
    assert_eq!(envelopes[0].data["key"], json!("textField"));
    assert_eq!(envelopes[0].data["overlay"]["left"], json!(15.0));

    assert!(!session.dropzone().unwrap().is_enabled());
    assert!(session.drag_session().is_none());
    Ok(())
}

#[test]
fn test_drag_without_drop_leaves_form_untouched() -> Result<()> {
    let (mut session, mut viewer) = editor_session(pdf_form());
    viewer.drain();
    let mut events = session.subscribe();
    let before = session.form().clone();

    session.on_drag_start("email");
    assert!(session.dropzone().unwrap().is_enabled());
    assert_eq!(session.on_drag_end(Some("email"))?, None);

    assert_eq!(session.form(), &before);
    assert!(!session.dropzone().unwrap().is_enabled());
    assert!(drain_events(&mut events).is_empty());
    assert!(viewer.drain().is_empty());
    Ok(())
}

#[test]
fn test_drop_elsewhere_is_not_a_placement() -> Result<()> {
    let (mut session, _viewer) = editor_session(pdf_form());

    session.on_drag_start("number");
    session.on_dropzone_drop(DropEvent {
        target: DropTarget::Elsewhere,
        offset: pdf_builder::Point::new(3.0, 4.0),
    });
    assert_eq!(session.on_drag_end(None)?, None);
    assert!(session.form().components.is_empty());
    Ok(())
}

#[test]
fn test_same_template_twice_gets_distinct_keys() -> Result<()> {
    let form = FormSchema {
        components: vec![ComponentNode::new("textfield").with_key("textField1")],
        ..pdf_form()
    };
    let (mut session, _viewer) = editor_session(form);

    let first = session.place("textfield", Overlay::at(pdf_builder::Point::new(0.0, 0.0)))?;
    let second = session.place("textfield", Overlay::at(pdf_builder::Point::new(0.0, 30.0)))?;

    assert_eq!(first.key, "textField");
    assert_eq!(second.key, "textField2");
    assert_ne!(first.id, second.id);
    assert_eq!(session.form().keys().len(), 3);
    Ok(())
}

#[test]
fn test_placed_node_does_not_alias_template() -> Result<()> {
    let (mut session, _viewer) = editor_session(pdf_form());
    let template = session.registry().template("email").unwrap().clone();

    let node = session.place("email", Overlay::at(pdf_builder::Point::new(1.0, 2.0)))?;
    assert!(session.handle_message(BridgeMessage::ComponentUpdate(
        pdf_builder::bridge::ComponentUpdate {
            id: node.id.clone(),
            overlay: Overlay::on_page(2, 9.0, 9.0, 9.0, 9.0),
        }
    )));

    assert_eq!(session.registry().template("email"), Some(&template));
    assert_eq!(template.overlay, None);
    Ok(())
}

#[test]
fn test_unknown_field_type_still_hides_dropzone() {
    let (mut session, _viewer) = editor_session(pdf_form());

    session.on_drag_start("hologram");
    session.on_dropzone_drop(DropEvent::on_dropzone(1.0, 1.0));
    let err = session.on_drag_end(None).unwrap_err();

    assert!(matches!(err, BuilderError::UnknownFieldType(ref t) if t == "hologram"));
    assert!(!session.dropzone().unwrap().is_enabled());
    assert!(session.form().components.is_empty());
}

#[test]
fn test_input_event_stream_places_component() -> Result<()> {
    let (mut session, _viewer) = editor_session(pdf_form());
    let script = [
        json!({"event": "dragStart", "fieldType": "checkbox"}),
        json!({"event": "dragOver", "target": "dropzone"}),
        json!({"event": "drop", "target": "dropzone", "offsetX": 7.5, "offsetY": 12.0}),
        json!({"event": "dragEnd", "fieldType": "checkbox"}),
    ];

    let mut placed = Vec::new();
    for step in script {
        let event: InputEvent = serde_json::from_value(step)?;
        if let Some(node) = session.handle_input(event)? {
            placed.push(node);
        }
    }

    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].component_type, "checkbox");
    assert_eq!(placed[0].overlay, Some(Overlay::at(pdf_builder::Point::new(7.5, 12.0))));
    Ok(())
}

#[test]
fn test_element_update_sets_exact_overlay() {
    let form = FormSchema {
        components: vec![ComponentNode::new("textfield").with_key("x").with_id("x")],
        ..pdf_form()
    };
    let (mut session, viewer) = editor_session(form);
    let mut events = session.subscribe();

    viewer.post_envelope(Envelope {
        name: "iframe-elementUpdate".to_string(),
        data: json!({"id": "x", "page": 1, "left": 10, "top": 20, "width": 50, "height": 30}),
    });
    assert_eq!(session.pump(), 1);

    let stored = session.form().find_by_id("x").unwrap();
    assert_eq!(stored.overlay, Some(Overlay::on_page(1, 10.0, 20.0, 50.0, 30.0)));
    assert_eq!(session.editing().map(|node| node.id.as_str()), Some("x"));

    let received = drain_events(&mut events);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], BuilderEvent::UpdateComponent(stored.clone()));
}

#[test]
fn test_component_update_emits_update_then_change() {
    let form = FormSchema {
        components: vec![ComponentNode::new("number").with_key("age").with_id("n1")],
        ..pdf_form()
    };
    let (mut session, viewer) = editor_session(form);
    let mut events = session.subscribe();

    viewer.post_envelope(Envelope {
        name: "iframe-componentUpdate".to_string(),
        data: json!({
            "id": "n1",
            "overlay": {"page": 2, "left": 1, "top": 2, "width": 3, "height": 4}
        }),
    });
    assert_eq!(session.pump(), 1);

    let names: Vec<_> = drain_events(&mut events).iter().map(BuilderEvent::name).collect();
    assert_eq!(names, vec!["updateComponent", "change"]);
    assert!(session.editing().is_none());
}

#[test]
fn test_component_update_for_unknown_id_is_silent() {
    let (mut session, viewer) = editor_session(pdf_form());
    let mut events = session.subscribe();
    let before = session.form().clone();

    viewer.post_envelope(Envelope {
        name: "iframe-componentUpdate".to_string(),
        data: json!({
            "id": "ghost",
            "overlay": {"left": 1, "top": 2, "width": 3, "height": 4}
        }),
    });
    assert_eq!(session.pump(), 0);

    assert_eq!(session.form(), &before);
    assert!(drain_events(&mut events).is_empty());
}

#[test]
fn test_component_click_opens_editor() {
    let form = FormSchema {
        components: vec![ComponentNode::new("signature").with_key("sig").with_id("s1")],
        ..pdf_form()
    };
    let (mut session, viewer) = editor_session(form);

    viewer.post_envelope(Envelope {
        name: "iframe-componentClick".to_string(),
        data: json!({"id": "s1"}),
    });
    session.pump();
    assert_eq!(session.editing().map(|node| node.key.as_str()), Some("sig"));
}

/// Form as a host would load it from storage: no instance ids anywhere
fn stored_form() -> FormSchema {
    serde_json::from_value(json!({
        "display": "pdf",
        "components": [
            {"key": "name", "type": "textfield", "label": "Name"},
            {"key": "age", "type": "number", "label": "Age"}
        ],
        "settings": {"pdf": {"id": "doc", "src": "/api/pdf/doc"}}
    }))
    .unwrap()
}

/// Ids by key, as the viewer sees them in the `form` message
fn viewer_ids(envelope: &Envelope) -> Vec<(String, String)> {
    envelope.data["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| {
            (
                node["key"].as_str().unwrap().to_string(),
                node["id"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

#[test]
fn test_loaded_form_is_addressable_by_viewer() {
    let (mut session, mut viewer) = editor_session(stored_form());
    let envelopes = viewer.drain();
    assert_eq!(envelopes[0].name, FORM);

    let ids = viewer_ids(&envelopes[0]);
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|(_, id)| !id.is_empty()));
    assert_ne!(ids[0].1, ids[1].1);
    let age_id = ids[1].1.clone();

    let mut events = session.subscribe();
    viewer.post_envelope(Envelope {
        name: "iframe-componentClick".to_string(),
        data: json!({"id": age_id}),
    });
    viewer.post_envelope(Envelope {
        name: "iframe-componentUpdate".to_string(),
        data: json!({
            "id": age_id,
            "overlay": {"page": 1, "left": 40, "top": 300, "width": 80, "height": 18}
        }),
    });
    assert_eq!(session.pump(), 2);

    let age = session.form().find_by_key("age").unwrap();
    assert_eq!(age.overlay, Some(Overlay::on_page(1, 40.0, 300.0, 80.0, 18.0)));
    assert_eq!(session.form().find_by_key("name").unwrap().overlay, None);

    let names: Vec<_> = drain_events(&mut events).iter().map(BuilderEvent::name).collect();
    assert_eq!(names, vec!["updateComponent", "change"]);
}

#[test]
fn test_empty_id_messages_are_silent() {
    let (mut session, viewer) = editor_session(stored_form());
    let mut events = session.subscribe();
    let before = session.form().clone();

    viewer.post_envelope(Envelope {
        name: "iframe-componentUpdate".to_string(),
        data: json!({
            "id": "",
            "overlay": {"page": 1, "left": 1, "top": 2, "width": 3, "height": 4}
        }),
    });
    viewer.post_envelope(Envelope {
        name: "iframe-elementUpdate".to_string(),
        data: json!({"id": "", "page": 1, "left": 1, "top": 2, "width": 3, "height": 4}),
    });
    viewer.post_envelope(Envelope {
        name: "iframe-componentClick".to_string(),
        data: json!({"id": ""}),
    });
    assert_eq!(session.pump(), 0);

    assert_eq!(session.form(), &before);
    assert!(session.editing().is_none());
    assert!(drain_events(&mut events).is_empty());
}

#[test]
fn test_malformed_and_unknown_messages_are_ignored() {
    let (mut session, viewer) = editor_session(pdf_form());
    let mut events = session.subscribe();

    viewer.post_envelope(Envelope {
        name: "iframe-elementUpdate".to_string(),
        data: json!({"id": 5}),
    });
    viewer.post_envelope(Envelope {
        name: "iframe-scroll".to_string(),
        data: json!({"top": 10}),
    });
    assert_eq!(session.pump(), 0);
    assert!(drain_events(&mut events).is_empty());
}

#[test]
fn test_set_form_posts_form_to_viewer() {
    let (mut session, mut viewer) = editor_session(FormSchema::pdf());
    let first = viewer.drain();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].name, FORM);

    session.set_form(pdf_form()).unwrap();
    let envelopes = viewer.drain();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].data["settings"]["pdf"]["id"], json!("doc"));
    assert_eq!(session.view(), BuilderView::Editor);
}

#[test]
fn test_attach_without_pdf_shows_upload_panel() {
    let mut session = BuilderSession::new(BuilderOptions::new().with_pdf_server("http://pdf"));
    session.attach();

    assert_eq!(session.view(), BuilderView::Upload);
    assert!(session.upload_panel().is_loaded());
    assert!(!session.upload_panel().is_error_visible());
    assert!(session.dropzone().is_none());
    assert!(session.sidebar().is_empty());
}

#[test]
fn test_attach_without_pdf_server_shows_error() {
    let mut session = BuilderSession::new(BuilderOptions::new());
    session.attach();

    assert!(session.upload_panel().is_error_visible());
    assert_eq!(session.upload_panel().error_text(), PDF_SERVER_NOT_SET);
}

#[test]
fn test_dropzone_falls_back_without_measurement() {
    let (builder_end, _viewer_end) = bridge_pair();
    let mut session =
        BuilderSession::with_viewer(BuilderOptions::new(), PdfViewer::new(builder_end));
    session.set_form(pdf_form()).unwrap();
    session.attach();

    let dropzone = session.dropzone().unwrap();
    assert_eq!(dropzone.height().to_string(), "1000px");
    assert_eq!(dropzone.width().to_string(), "100%");

    session.on_viewer_attach(ViewerContainer::new(1));
    session.on_window_resize(Some(Rect::from_size(640.0, 0.0)));
    let dropzone = session.dropzone().unwrap();
    assert_eq!(dropzone.width(), CssLength::Px(640.0));
    assert_eq!(dropzone.height(), CssLength::Px(1000.0));
}

#[test]
fn test_skip_init_defers_initialization() {
    let options = BuilderOptions {
        skip_init: true,
        ..BuilderOptions::new()
    };
    let mut session = BuilderSession::new(options);
    assert!(!session.is_initialized());

    session.attach();
    assert!(session.is_initialized());
}

#[test]
fn test_destroy_disconnects_viewer() {
    let (mut session, _viewer) = editor_session(pdf_form());
    session.destroy();

    assert!(!session.viewer().is_connected());
    assert!(session.dropzone().is_none());
    assert_eq!(session.view(), BuilderView::Detached);
}

#[tokio::test]
async fn test_upload_without_pdf_server_makes_no_request() {
    let mut session = BuilderSession::new(BuilderOptions::new());
    let transport = FakeTransport::answering(200, "OK", "{}");

    let outcome = session.upload(&transport, &sample_pdf()).await;

    assert_eq!(outcome, UploadOutcome::NotConfigured);
    assert_eq!(transport.calls(), 0);
    assert!(!session.upload_panel().error_text().is_empty());
}

#[tokio::test]
async fn test_upload_rejected_shows_status_and_body() {
    let mut session = BuilderSession::new(BuilderOptions::new().with_pdf_server("http://pdf/upload"));
    session.attach();
    let transport = FakeTransport::answering(500, "Internal Server Error", "oops");

    let outcome = session.upload(&transport, &sample_pdf()).await;

    assert_eq!(outcome, UploadOutcome::Rejected { status: 500 });
    assert_eq!(transport.calls(), 1);
    assert_eq!(
        transport.last_url.lock().unwrap().as_deref(),
        Some("http://pdf/upload")
    );
    assert_eq!(session.upload_panel().error_text(), "Internal Server Error - oops");
    assert!(session.upload_panel().is_error_visible());
}

#[tokio::test]
async fn test_upload_network_failure() {
    let mut session = BuilderSession::new(BuilderOptions::new().with_pdf_server("http://pdf"));
    session.attach();
    let transport = FakeTransport::unreachable();

    let outcome = session.upload(&transport, &sample_pdf()).await;

    assert_eq!(outcome, UploadOutcome::Failed);
    assert_eq!(session.upload_panel().error_text(), UPLOAD_FAILED);
}

#[tokio::test]
async fn test_upload_success_switches_to_editor() {
    let (builder_end, mut viewer_end) = bridge_pair();
    let mut session = BuilderSession::with_viewer(
        BuilderOptions::new().with_pdf_server("http://pdf"),
        PdfViewer::new(builder_end),
    );
    session.attach();
    let mut events = session.subscribe();
    let transport =
        FakeTransport::answering(200, "OK", r#"{"id": "abc", "src": "/api/pdf/abc"}"#);

    let outcome = session.upload(&transport, &sample_pdf()).await;

    let expected = PdfSettings {
        id: "abc".to_string(),
        src: "/api/pdf/abc".to_string(),
    };
    assert_eq!(outcome, UploadOutcome::Uploaded(Some(expected.clone())));
    assert_eq!(session.form().settings.pdf, Some(expected));
    assert_eq!(session.view(), BuilderView::Editor);
    assert!(!session.upload_panel().is_loaded());
    assert_eq!(session.upload_panel().error_text(), "");

    let names: Vec<_> = drain_events(&mut events).iter().map(BuilderEvent::name).collect();
    assert_eq!(names, vec!["change"]);
    let envelopes = viewer_end.drain();
    assert_eq!(envelopes.last().map(|e| e.name.as_str()), Some(FORM));
}

#[tokio::test]
async fn test_run_applies_messages_until_viewer_closes() {
    let form = FormSchema {
        components: vec![ComponentNode::new("textfield").with_key("x").with_id("x")],
        ..pdf_form()
    };
    let (mut session, viewer) = editor_session(form);

    viewer.post_envelope(Envelope {
        name: "iframe-componentClick".to_string(),
        data: json!({"id": "x"}),
    });
    drop(viewer);

    session.run().await;
    assert_eq!(session.editing().map(|node| node.id.as_str()), Some("x"));
}
