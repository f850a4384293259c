//! Example of a builder session talking to a simulated PDF viewer
//!
//! The viewer runs as its own task: it answers every `addElement` with an
//! `iframe-elementUpdate` placing the component on page 1, the same way the
//! embedded viewer reports positions back to the builder.

use pdf_builder::bridge::message::ADD_ELEMENT;
use pdf_builder::bridge::ElementUpdate;
use pdf_builder::{
    bridge_pair, BridgeMessage, BuilderEvent, BuilderOptions, BuilderSession, ComponentNode,
    DropEvent, FormSchema, PdfSettings, PdfViewer, Rect, Result, ViewerContainer,
};

#[tokio::main]
async fn main() -> Result<()> {
    let (builder_end, mut viewer_end) = bridge_pair();

    let viewer = tokio::spawn(async move {
        while let Some(envelope) = viewer_end.recv().await {
            println!("viewer <- {}", envelope.name);
            if envelope.name != ADD_ELEMENT {
                continue;
            }
            let Ok(node) = serde_json::from_value::<ComponentNode>(envelope.data) else {
                continue;
            };
            let Some(overlay) = node.overlay else {
                continue;
            };
            let update = BridgeMessage::ElementUpdate(ElementUpdate {
                id: node.id,
                page: Some(1),
                left: overlay.left,
                top: overlay.top,
                width: overlay.width,
                height: overlay.height,
            });
            if let Ok(reply) = update.to_envelope() {
                viewer_end.post_envelope(reply);
            }
        }
    });

    let mut session =
        BuilderSession::with_viewer(BuilderOptions::new(), PdfViewer::new(builder_end));
    let mut events = session.subscribe();

    let mut form = FormSchema::pdf();
    form.settings.pdf = Some(PdfSettings {
        id: "w9".to_string(),
        src: "/api/pdf/w9".to_string(),
    });
    session.set_form(form)?;
    session.attach();
    session.on_viewer_attach(ViewerContainer::new(1).with_rect(Rect::from_size(612.0, 792.0)));

    for (field_type, x, y) in [("textfield", 72.0, 120.0), ("signature", 72.0, 640.0)] {
        session.on_drag_start(field_type);
        session.on_dropzone_drop(DropEvent::on_dropzone(x, y));
        session.on_drag_end(Some(field_type))?;
    }

    // Wait for both position reports
    let mut positioned = 0;
    while positioned < 2 {
        match session.recv().await {
            Some(true) => positioned += 1,
            Some(false) => {}
            None => break,
        }
    }

    while let Ok(event) = events.try_recv() {
        match &event {
            BuilderEvent::AddComponent(node) | BuilderEvent::UpdateComponent(node) => {
                println!("{:<16} {:<12} {:?}", event.name(), node.key, node.overlay);
            }
            BuilderEvent::Change(form) => {
                println!("{:<16} {} components", event.name(), form.component_count());
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(session.form())?);

    session.destroy();
    viewer.abort();
    Ok(())
}
