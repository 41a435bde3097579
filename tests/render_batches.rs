mod support;

use std::cell::Cell;
use std::rc::Rc;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use support::{
    child_ids, committed, first_child, first_handler, handle_in, renderer, HandleSlot, Journal,
    View,
};
use tape_render::{
    EventArgs, EventCallback, EventHandlerId, Frame, Parameters, RenderError, RenderTreeEdit,
};

fn greeting(journal: &Journal) -> View {
    View::new("root", journal, |parameters, builder| {
        builder.open_element("div");
        builder.add_attribute("class", "greeting");
        builder.add_content(format!("Hello {}", parameters.text("name").unwrap_or("nobody")));
        builder.close_element();
        Ok(())
    })
}

fn list(journal: &Journal) -> View {
    View::new("list", journal, |parameters, builder| {
        let tag = if parameters.bool("ordered").unwrap_or(false) {
            "ol"
        } else {
            "ul"
        };
        builder.open_element(tag);
        builder.add_attribute("class", "items");
        for item in parameters
            .text("items")
            .unwrap_or_default()
            .split(',')
            .filter(|item| !item.is_empty())
        {
            builder.open_element("li");
            builder.add_content(item.to_string());
            builder.close_element();
        }
        builder.close_element();
        Ok(())
    })
}

#[test]
fn root_render_emits_one_batch_with_one_diff() {
    let journal = Journal::default();
    let mut renderer = renderer();
    let root = renderer.add_root_component(greeting(&journal)).expect("attach");

    renderer
        .render_root(root, Parameters::new().with("name", "World"))
        .expect("render");

    let display = renderer.display();
    assert_eq!(display.batches.len(), 1);
    let batch = display.last_batch();
    assert_eq!(batch.updated_components.len(), 1);
    assert_eq!(batch.updated_components[0].component_id, root);
    assert_eq!(
        batch.updated_components[0].edits,
        vec![
            RenderTreeEdit::InsertFrame {
                index: 0,
                reference_frame_index: 0
            },
            RenderTreeEdit::InsertFrame {
                index: 1,
                reference_frame_index: 1
            },
            RenderTreeEdit::InsertFrame {
                index: 2,
                reference_frame_index: 2
            },
        ]
    );
    assert!(batch.disposed_component_ids.is_empty());
    assert!(batch.disposed_event_handler_ids.is_empty());
    assert_eq!(display.mirror(root), committed(&renderer, root).as_slice());
    assert_eq!(
        journal.entries(),
        vec![
            "root:configure",
            "root:parameters",
            "root:render",
            "root:after_render:true"
        ]
    );
}

#[test]
fn after_render_reports_first_render_only_once() {
    let journal = Journal::default();
    let mut renderer = renderer();
    let root = renderer.add_root_component(greeting(&journal)).expect("attach");

    renderer
        .render_root(root, Parameters::new().with("name", "a"))
        .expect("first render");
    renderer
        .render_root(root, Parameters::new().with("name", "b"))
        .expect("second render");

    assert_eq!(journal.count("root:after_render:true"), 1);
    assert_eq!(journal.count("root:after_render:false"), 1);
    assert!(renderer.component(root).expect("live").has_rendered());
}

#[test]
fn renders_requested_by_one_event_are_coalesced() {
    let journal = Journal::default();
    let slot = HandleSlot::default();
    let clicks = Rc::new(Cell::new(0_u32));

    let on_click = {
        let slot = Rc::clone(&slot);
        let clicks = Rc::clone(&clicks);
        EventCallback::from_fn(move |_| {
            clicks.set(clicks.get() + 1);
            let handle = handle_in(&slot);
            handle.request_render().expect("owner thread");
            handle.request_render().expect("owner thread");
        })
    };
    let counter = {
        let clicks = Rc::clone(&clicks);
        View::new("counter", &journal, move |_, builder| {
            builder.open_element("button");
            builder.add_attribute("onclick", on_click.clone());
            builder.add_content(format!("clicked {}", clicks.get()));
            builder.close_element();
            Ok(())
        })
        .with_slot(&slot)
    };

    let mut renderer = renderer();
    let root = renderer.add_root_component(counter).expect("attach");
    renderer.render_root(root, Parameters::new()).expect("render");
    let handler = first_handler(&renderer, root);

    let mut dispatch = renderer
        .dispatch_event(handler, None, EventArgs::new("click"))
        .expect("dispatch");

    assert_eq!(dispatch.try_outcome(), Some(tape_render::DispatchOutcome::Completed));
    assert_eq!(renderer.display().batches.len(), 2);
    let batch = renderer.display().last_batch();
    assert_eq!(batch.updated_components.len(), 1);
    assert_eq!(
        batch.updated_components[0].edits,
        vec![RenderTreeEdit::UpdateFrame {
            index: 2,
            reference_frame_index: 0
        }]
    );
    assert_eq!(first_handler(&renderer, root), handler);
    assert_eq!(journal.count("counter:render"), 2);
    assert_eq!(renderer.display().mirror(root), committed(&renderer, root).as_slice());
}

#[test]
fn unknown_handler_is_rejected_without_a_batch() {
    let journal = Journal::default();
    let mut renderer = renderer();
    let root = renderer.add_root_component(greeting(&journal)).expect("attach");
    renderer.render_root(root, Parameters::new()).expect("render");

    let result =
        renderer.dispatch_event(EventHandlerId::from_raw(9999), None, EventArgs::new("click"));

    assert_matches!(result, Err(RenderError::UnknownEventHandler(id)) if id.raw() == 9999);
    assert_eq!(renderer.display().batches.len(), 1);
}

#[test]
fn replayed_diffs_reproduce_committed_frames() {
    let journal = Journal::default();
    let mut renderer = renderer();
    let root = renderer.add_root_component(list(&journal)).expect("attach");

    let steps = [
        ("a,b,c", false),
        ("a,b", false),
        ("x,b,c,d", false),
        ("x,b,c,d", true),
        ("", true),
        ("q", false),
    ];
    for (step, (items, ordered)) in steps.into_iter().enumerate() {
        renderer
            .render_root(
                root,
                Parameters::new().with("items", items).with("ordered", ordered),
            )
            .expect("render");
        assert_eq!(renderer.display().batches.len(), step + 1);
        assert_eq!(
            renderer.display().mirror(root),
            committed(&renderer, root).as_slice(),
            "mirror diverged after step {step}"
        );
    }

    assert_eq!(
        committed(&renderer, root),
        vec![
            Frame::Element {
                tag: "ul".into(),
                subtree_length: 4
            },
            Frame::Attribute {
                name: "class".into(),
                value: "items".into(),
                handler_id: None
            },
            Frame::Element {
                tag: "li".into(),
                subtree_length: 2
            },
            Frame::text("q"),
        ]
    );
}

#[test]
fn unchanged_primitive_parameters_skip_the_child() {
    let journal = Journal::default();
    let label = View::new("label", &journal, |parameters, builder| {
        builder.open_element("span");
        builder.add_content(parameters.text("text").unwrap_or_default().to_string());
        builder.close_element();
        Ok(())
    })
    .into_type();
    let parent = View::new("parent", &journal, move |parameters, builder| {
        builder.open_element("section");
        builder.add_component(
            label.clone(),
            Parameters::new()
                .with("text", parameters.text("label").unwrap_or_default())
                .with("level", 2_i64),
        );
        builder.close_element();
        Ok(())
    });

    let mut renderer = renderer();
    let root = renderer.add_root_component(parent).expect("attach");

    renderer
        .render_root(root, Parameters::new().with("label", "one"))
        .expect("first render");
    let child = first_child(&renderer, root);
    assert_eq!(renderer.component(child).expect("child").parent(), Some(root));
    let rendered: Vec<_> = renderer
        .display()
        .last_batch()
        .updated_components
        .iter()
        .map(|diff| diff.component_id)
        .collect();
    assert_eq!(rendered, vec![root, child]);

    renderer
        .render_root(root, Parameters::new().with("label", "one"))
        .expect("same parameters");
    let batch = renderer.display().last_batch();
    assert_eq!(batch.updated_components.len(), 1);
    assert!(batch.updated_components[0].is_empty());
    assert_eq!(journal.count("label:parameters"), 1);

    renderer
        .render_root(root, Parameters::new().with("label", "two"))
        .expect("new parameters");
    let batch = renderer.display().last_batch();
    assert_eq!(batch.diffs_for(child).count(), 1);
    assert_eq!(journal.count("label:parameters"), 2);
    assert_eq!(first_child(&renderer, root), child);
    assert_eq!(
        renderer.display().mirror(child),
        committed(&renderer, child).as_slice()
    );
}

#[test]
fn removing_a_child_disposes_its_subtree_and_handlers() {
    let journal = Journal::default();
    let leaf = View::new("leaf", &journal, |_, builder| {
        builder.add_content("leaf");
        Ok(())
    })
    .into_type();
    let on_press = EventCallback::from_fn(|_| {});
    let child = View::new("child", &journal, move |_, builder| {
        builder.open_element("button");
        builder.add_attribute("onclick", on_press.clone());
        builder.close_element();
        builder.add_component(leaf.clone(), Parameters::new());
        Ok(())
    })
    .into_type();
    let parent = View::new("parent", &journal, move |parameters, builder| {
        builder.open_element("main");
        if parameters.bool("show").unwrap_or(false) {
            builder.add_component(child.clone(), Parameters::new());
        }
        builder.close_element();
        Ok(())
    });

    let mut renderer = renderer();
    let root = renderer.add_root_component(parent).expect("attach");
    renderer
        .render_root(root, Parameters::new().with("show", true))
        .expect("show");
    let child_id = first_child(&renderer, root);
    let leaf_id = child_ids(&committed(&renderer, child_id))[0];
    let handler = first_handler(&renderer, child_id);
    assert_eq!(renderer.component_count(), 3);

    renderer
        .render_root(root, Parameters::new().with("show", false))
        .expect("hide");

    let batch = renderer.display().last_batch();
    assert_eq!(batch.disposed_component_ids, vec![child_id, leaf_id]);
    assert_eq!(batch.disposed_event_handler_ids, vec![handler]);
    assert!(journal.contains("child:dispose"));
    assert!(journal.contains("leaf:dispose"));
    assert_eq!(renderer.component_count(), 1);
    assert!(renderer.display().mirror(child_id).is_empty());
    assert_matches!(
        renderer.dispatch_event(handler, None, EventArgs::new("click")),
        Err(RenderError::UnknownEventHandler(_))
    );
}

#[test]
fn removing_a_root_emits_a_disposal_batch() {
    let journal = Journal::default();
    let mut renderer = renderer();
    let root = renderer.add_root_component(greeting(&journal)).expect("attach");
    renderer.render_root(root, Parameters::new()).expect("render");

    renderer.remove_root_component(root).expect("remove");

    let batch = renderer.display().last_batch();
    assert!(batch.updated_components.is_empty());
    assert_eq!(batch.disposed_component_ids, vec![root]);
    assert_eq!(journal.count("root:dispose"), 1);
    assert_matches!(
        renderer.remove_root_component(root),
        Err(RenderError::UnknownComponent(id)) if id == root
    );
}

#[test]
fn only_roots_can_be_removed_directly() {
    let journal = Journal::default();
    let child = greeting(&journal).into_type();
    let parent = View::new("parent", &journal, move |_, builder| {
        builder.add_component(child.clone(), Parameters::new());
        Ok(())
    });
    let mut renderer = renderer();
    let root = renderer.add_root_component(parent).expect("attach");
    renderer.render_root(root, Parameters::new()).expect("render");

    let child_id = first_child(&renderer, root);
    assert_matches!(
        renderer.remove_root_component(child_id),
        Err(RenderError::NotARootComponent(id)) if id == child_id
    );
}
