// tests/face_integration_tests.rs
//! Integration tests for realistic face scenarios

use hugoface::face_core::attrs::merge_height;
use hugoface::face_core::dummy_backend::{DummyDisplay, DummyFontMatcher, DummyText};
use hugoface::face_core::{InputBlocker, Overlay, ScopeRef, TtyCaps};
use hugoface::{
    Attr, AttrValue, BasicFace, FaceError, FaceRef, FaceRegistry, PositionQuery, Scope, Surface, SurfaceParams,
    TtyColorTable, Value, DEFAULT_FACE_ID,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn registry() -> FaceRegistry {
    let mut registry = FaceRegistry::new();
    registry.set_attribute("bold", ":weight", &Value::sym("bold"), Scope::Global).unwrap();
    registry.set_attribute("italic", ":slant", &Value::sym("italic"), Scope::Global).unwrap();
    registry.set_attribute("error", ":foreground", &Value::str("red"), Scope::Global).unwrap();
    registry.set_attribute("error", ":inherit", &Value::sym("bold"), Scope::Global).unwrap();
    registry
}

fn window(registry: &FaceRegistry, id: u32) -> Surface {
    let mut surface = Surface::graphical(
        id,
        SurfaceParams::new().with_colors("black", "white"),
        Box::new(DummyDisplay::new()),
        Box::new(DummyFontMatcher::new()),
    );
    registry.init_surface(&mut surface).unwrap();
    surface
}

fn terminal(registry: &FaceRegistry) -> Surface {
    let display = DummyDisplay::terminal(TtyColorTable::ansi8(), TtyCaps::all());
    let mut surface = Surface::terminal(9, SurfaceParams::new(), Box::new(display));
    registry.init_surface(&mut surface).unwrap();
    surface
}

#[test]
fn test_bold_lookup_hits_cache() {
    let registry = registry();
    let mut surface = window(&registry, 1);
    let before = surface.cache().len();

    let first = surface.lookup_named_face(&registry, "bold", true).unwrap();
    let after_first = surface.cache().len();
    let second = surface.lookup_named_face(&registry, "bold", true).unwrap();

    assert_eq!(first, second);
    assert_eq!(after_first, before + 1);
    assert_eq!(surface.cache().len(), after_first);
    let font = surface.face(first).unwrap().font.as_ref().unwrap();
    assert_eq!(font.weight, hugoface::face_core::Weight::Bold);
}

#[test]
fn test_inherited_attributes_reach_the_face() {
    let registry = registry();
    let mut surface = window(&registry, 1);
    let id = surface.lookup_named_face(&registry, "error", true).unwrap();
    let face = surface.face(id).unwrap();
    assert_eq!(face.foreground, 0xff0000);
    assert_eq!(face.lface[Attr::Weight], AttrValue::Weight(hugoface::face_core::Weight::Bold));
}

#[test]
fn test_inheritance_cycle_terminates() {
    let mut registry = registry();
    registry.set_attribute("x", ":foreground", &Value::str("red"), Scope::Global).unwrap();
    registry.set_attribute("x", ":inherit", &Value::sym("y"), Scope::Global).unwrap();
    registry.set_attribute("y", ":background", &Value::str("blue"), Scope::Global).unwrap();
    registry.set_attribute("y", ":inherit", &Value::sym("x"), Scope::Global).unwrap();
    let mut surface = window(&registry, 1);
    surface.take_diagnostics();

    let id = surface.lookup_named_face(&registry, "x", true).unwrap();
    let face = surface.face(id).unwrap();
    assert_eq!(face.foreground, 0xff0000);
    assert_eq!(face.background, 0x0000ff);
    assert!(!surface.diagnostics().is_empty());
}

#[test]
fn test_alias_cycles_resolve_to_default() {
    let mut registry = registry();
    registry.face_alias("loop", Some("loop"));
    registry.face_alias("ping", Some("pong"));
    registry.face_alias("pong", Some("ping"));
    registry.face_alias("warning", Some("error"));

    assert_eq!(registry.resolve_face_name("loop"), "default");
    assert_eq!(registry.resolve_face_name("ping"), "default");
    assert_eq!(registry.resolve_face_name("warning"), "error");
    assert!(matches!(registry.resolve_face_name_checked("ping"), Err(FaceError::AliasCycle { .. })));

    let mut surface = window(&registry, 1);
    let warning = surface.lookup_named_face(&registry, "warning", true).unwrap();
    let error = surface.lookup_named_face(&registry, "error", true).unwrap();
    assert_eq!(warning, error);
}

#[test]
fn test_remapping_default_onto_itself() {
    let registry = registry();
    let mut surface = window(&registry, 1);
    let remap = FaceRef::List(vec![
        FaceRef::plist([(":background", Value::str("blue"))]),
        FaceRef::named("default"),
    ]);
    surface.set_face_remapping("default", remap);

    let id = surface.lookup_basic_face(&registry, DEFAULT_FACE_ID).unwrap();
    let face = surface.face(id).unwrap();
    assert_eq!(face.background, 0x0000ff);
    assert_eq!(face.foreground, 0x000000);

    let text = DummyText::new(4);
    let (at, _) = surface.resolve_face_at_position(&registry, &text, &PositionQuery::new(0, 4)).unwrap();
    assert_eq!(at, id);
}

#[test]
fn test_height_merging() {
    let absolute = AttrValue::Int(120);
    let scale = AttrValue::Scale(1.5);

    assert_eq!(merge_height(&absolute, &AttrValue::Int(100)), Some(AttrValue::Int(120)));
    assert_eq!(merge_height(&scale, &AttrValue::Int(100)), Some(AttrValue::Int(150)));
    assert_eq!(merge_height(&scale, &AttrValue::Scale(2.0)), Some(AttrValue::Scale(3.0)));
    assert_eq!(merge_height(&AttrValue::Unspecified, &AttrValue::Int(90)), Some(AttrValue::Int(90)));
    assert_eq!(merge_height(&AttrValue::Scale(-1.0), &AttrValue::Int(100)), None);

    let merged = FaceRegistry::merge_face_attribute(":height", &Value::Float(2.0), &Value::Int(100));
    assert_eq!(merged, Value::Int(200));
    assert!(FaceRegistry::face_attribute_relative_p(":height", &Value::Float(1.2)));
    assert!(!FaceRegistry::face_attribute_relative_p(":height", &Value::Int(120)));
}

#[test]
fn test_cache_keeps_distinct_faces_apart() {
    let registry = registry();
    let mut surface = window(&registry, 1);
    let colors = ["red", "green", "blue", "yellow", "cyan", "magenta", "gray50", "orange"];
    let weights = ["normal", "bold", "light"];
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut seen: Vec<((usize, usize), usize)> = Vec::new();

    for _ in 0..200 {
        let key = (rng.random_range(0..colors.len()), rng.random_range(0..weights.len()));
        let face_ref = FaceRef::plist([
            (":foreground", Value::str(colors[key.0])),
            (":weight", Value::sym(weights[key.1])),
        ]);
        let id = surface.resolve_face_for_char(&registry, DEFAULT_FACE_ID, 'a', Some(&face_ref)).unwrap();

        match seen.iter().find(|(seen_key, _)| *seen_key == key) {
            Some((_, seen_id)) => assert_eq!(*seen_id, id, "{key:?}"),
            None => {
                assert!(seen.iter().all(|(_, other)| *other != id), "{key:?} shares face {id}");
                seen.push((key, id));
            }
        }
    }
}

#[test]
fn test_terminal_faces_use_the_palette() {
    let registry = registry();
    let mut surface = terminal(&registry);
    let id = surface.lookup_named_face(&registry, "error", true).unwrap();
    let face = surface.face(id).unwrap();
    assert_eq!(face.foreground, 1);
    assert!(face.tty.bold);

    assert!(surface.supports_face_attributes(&registry, &FaceRef::named("bold")).unwrap());
    assert!(!surface.supports_face_attributes(&registry, &FaceRef::plist([(":height", Value::Int(140))])).unwrap());
    assert_eq!(surface.face_font(&registry, "bold", None).unwrap().as_deref(), Some("tty"));
}

#[test]
fn test_allocation_blocks_input() {
    let registry = registry();
    let blocker = InputBlocker::new();
    let display = DummyDisplay::new().with_input_blocker(blocker.clone());
    let log = display.log();
    let mut surface = Surface::graphical(
        3,
        SurfaceParams::new().with_colors("black", "white"),
        Box::new(display),
        Box::new(DummyFontMatcher::new()),
    )
    .with_input_blocker(blocker.clone());
    registry.init_surface(&mut surface).unwrap();

    let id = surface.lookup_named_face(&registry, "error", true).unwrap();
    surface.prepare_face_for_display(id).unwrap();

    assert!(!log.borrow().allocated_colors.is_empty());
    assert_eq!(log.borrow().unblocked_allocations, 0);
    assert!(!blocker.is_blocked());
}

#[test]
fn test_surface_edits_rebuild_on_redisplay() {
    let mut registry = registry();
    let mut surfaces = vec![window(&registry, 1), window(&registry, 2)];

    registry
        .set_attribute("default", ":foreground", &Value::str("blue"), Scope::All(&mut surfaces))
        .unwrap();
    assert!(surfaces.iter().all(|surface| surface.face_change()));
    assert_eq!(
        registry.get_attribute("default", ":foreground", ScopeRef::Surface(&surfaces[0])).unwrap(),
        Value::str("blue")
    );

    registry.redisplay_surfaces(&mut surfaces).unwrap();
    for surface in &surfaces {
        assert!(!surface.face_change());
        assert_eq!(surface.face(DEFAULT_FACE_ID).unwrap().foreground, 0x0000ff);
        assert_eq!(surface.params.foreground_color.as_deref(), Some("blue"));
        assert!(surface.face(BasicFace::ModeLine.id()).is_some());
    }
}

#[test]
fn test_overlay_faces_stack_on_text() {
    let registry = registry();
    let mut surface = window(&registry, 1);
    let text = DummyText::new(12).with_face(0..6, FaceRef::named("italic")).with_overlay(Overlay {
        start: 4,
        end: 10,
        priority: 0,
        face: Some(FaceRef::named("error")),
        mouse_face: None,
    });

    let (id, next) = surface.resolve_face_at_position(&registry, &text, &PositionQuery::new(5, 12)).unwrap();
    assert_eq!(next, 6);
    let face = surface.face(id).unwrap();
    assert_eq!(face.foreground, 0xff0000);
    assert_eq!(face.lface[Attr::Slant], AttrValue::Slant(hugoface::face_core::Slant::Italic));
    assert_eq!(face.lface[Attr::Weight], AttrValue::Weight(hugoface::face_core::Weight::Bold));
}
