//! Catalog registration, derived views, write-through deletion, and
//! group operations.

use kette::{
    BoxError, Catalog, CatalogError, Completion, Handler, Options, OptionsPatch, Outcome,
};
use std::sync::{Arc, Mutex};

fn plus_one() -> Handler<i64> {
    Handler::callback(|args: Vec<i64>, done: Completion<i64>| {
        done.resolve_one(args[0] + 1);
    })
}

fn failing() -> Handler<i64> {
    Handler::callback(|_args: Vec<i64>, done: Completion<i64>| done.reject("boom"))
}

#[tokio::test]
async fn register_then_query() {
    let catalog: Catalog<i64> = Catalog::new();
    assert!(catalog.is_empty());
    assert!(!catalog.has("a"));

    catalog.register("a", plus_one()).unwrap();
    catalog.register("b", plus_one()).unwrap();

    assert!(catalog.has("a"));
    assert!(!catalog.is_empty());
    assert_eq!(catalog.len(), 2);
    assert_eq!(
        catalog.event_names(),
        vec!["a".to_string(), "b".to_string()],
        "names list in registration order"
    );
}

#[tokio::test]
async fn duplicate_registration_is_a_synchronous_conflict() {
    let catalog: Catalog<i64> = Catalog::new();
    catalog.register("a", plus_one()).unwrap();

    let err = catalog.register("a", plus_one()).unwrap_err();
    assert!(matches!(err, CatalogError::AlreadyRegistered(ref name) if name == "a"));
    assert_eq!(catalog.len(), 1, "the first registration survives");
}

#[tokio::test]
async fn select_tolerates_missing_names() {
    let catalog: Catalog<i64> = Catalog::new();
    catalog.register("a", plus_one()).unwrap();
    catalog.register("b", plus_one()).unwrap();

    let view = catalog.select(["a", "missing"]);
    assert_eq!(view.event_names(), vec!["a".to_string()]);
    assert!(!view.has("missing"));

    let empty = catalog.select(["ghost", "phantom"]);
    assert!(empty.is_empty());
}

#[tokio::test]
async fn removal_through_a_view_writes_through_to_the_root() {
    let catalog: Catalog<i64> = Catalog::new();
    catalog.register("a", plus_one()).unwrap();
    catalog.register("b", plus_one()).unwrap();

    let view = catalog.select(["a", "b"]);
    let sibling = catalog.select(["a"]);

    view.remove(["a"]);

    assert!(!catalog.has("a"), "root mapping must lose the entry");
    assert!(!view.has("a"));
    assert!(!sibling.has("a"), "sibling views must not resurrect the entry");
    assert!(catalog.has("b"));
}

#[tokio::test]
async fn clear_on_a_view_removes_only_its_visible_entries() {
    let catalog: Catalog<i64> = Catalog::new();
    catalog.register("a", plus_one()).unwrap();
    catalog.register("b", plus_one()).unwrap();
    catalog.register("c", plus_one()).unwrap();

    catalog.select(["a", "b"]).clear();

    assert_eq!(catalog.event_names(), vec!["c".to_string()]);

    catalog.clear();
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn broadcast_applies_to_currently_visible_entries_only() {
    let catalog: Catalog<i64> = Catalog::new();
    let a = catalog.register("a", plus_one()).unwrap();
    let b = catalog.register("b", plus_one()).unwrap();

    let view = catalog.select(["a"]);
    view.pre(plus_one());

    assert_eq!(a.stage_count(), 2);
    assert_eq!(b.stage_count(), 1, "entries outside the view are untouched");

    // An entry registered after the view was derived is not covered by it.
    let c = catalog.register("c", plus_one()).unwrap();
    view.post(plus_one());
    assert_eq!(a.stage_count(), 3);
    assert_eq!(c.stage_count(), 1);
}

#[tokio::test]
async fn broadcast_error_sink_covers_every_visible_pipeline() {
    let catalog: Catalog<i64> = Catalog::new();
    catalog.register("a", failing()).unwrap();
    catalog.register("b", failing()).unwrap();

    let intercepted = Arc::new(Mutex::new(0));
    let counter = intercepted.clone();
    catalog.on_error(move |err: BoxError| {
        let counter = counter.clone();
        async move {
            *counter.lock().unwrap() += 1;
            Err::<Outcome<i64>, BoxError>(err)
        }
    });

    assert!(catalog.call("a", vec![1]).unwrap().await.is_err());
    assert!(catalog.call("b", vec![1]).unwrap().await.is_err());
    assert_eq!(*intercepted.lock().unwrap(), 2);
}

#[tokio::test]
async fn name_targeted_operations_fail_on_absent_names() {
    let catalog: Catalog<i64> = Catalog::new();
    let a = catalog.register("a", plus_one()).unwrap();

    let err = catalog.pre_on(["a", "missing"], plus_one()).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(ref name) if name == "missing"));
    assert_eq!(a.stage_count(), 1, "nothing is modified on a failed lookup");

    catalog.pre_on(["a"], plus_one()).unwrap();
    catalog.post_on(["a"], vec![plus_one(), plus_one()]).unwrap();
    assert_eq!(a.stage_count(), 4);

    assert!(
        catalog
            .on_error_on(
                ["missing"],
                |err: BoxError| async move { Err::<Outcome<i64>, BoxError>(err) },
            )
            .is_err()
    );
}

#[tokio::test]
async fn catalog_defaults_flow_into_registered_pipelines() {
    let catalog: Catalog<i64> =
        Catalog::with_defaults(Options::default().apply(OptionsPatch::new().multi_args(false)));

    let p = catalog.register("a", plus_one()).unwrap();
    assert!(!p.options().multi_args);

    // A per-registration patch overrides the defaults.
    let q = catalog
        .register_with("b", plus_one(), OptionsPatch::new().multi_args(true))
        .unwrap();
    assert!(q.options().multi_args);

    // set_options updates the defaults for later registrations and
    // broadcasts to visible pipelines.
    catalog.set_options(OptionsPatch::new().global_args(true));
    assert!(p.options().global_args);
    let r = catalog.register("c", plus_one()).unwrap();
    assert!(r.options().global_args);
    assert!(!r.options().multi_args);
}

#[tokio::test]
async fn dispatch_by_name_is_the_lookup_boundary() {
    let catalog: Catalog<i64> = Catalog::new();
    catalog.register("a", plus_one()).unwrap();

    let outcome = catalog.call("a", vec![1]).unwrap().await.unwrap();
    assert_eq!(outcome, Outcome::One(2));

    // Lookup failure is synchronous, before any async work starts.
    let err = catalog.call("missing", vec![1]).err().unwrap();
    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[tokio::test]
async fn dispatched_future_outlives_the_lookup() {
    let catalog: Catalog<i64> = Catalog::new();
    catalog.register("a", plus_one()).unwrap();

    // The returned future borrows nothing from the catalog; it can be
    // spawned and settles even after the entry and the catalog are gone.
    let dispatched = catalog.call("a", vec![1]).unwrap();
    catalog.remove(["a"]);
    drop(catalog);

    let outcome = tokio::spawn(dispatched).await.unwrap().unwrap();
    assert_eq!(outcome, Outcome::One(2));
}

#[test]
fn debug_renders_name_and_scope() {
    let catalog: Catalog<i64> = Catalog::new();
    let pipeline = catalog.register("a", plus_one()).unwrap();

    assert_eq!(format!("{pipeline:?}"), "Pipeline { name: \"a\", stages: 1 }");
    assert_eq!(
        format!("{catalog:?}"),
        "Catalog { events: [\"a\"], view: false }"
    );
    assert_eq!(
        format!("{:?}", catalog.select(["a"])),
        "Catalog { events: [\"a\"], view: true }"
    );
}

#[tokio::test]
async fn registration_through_a_view_stays_local_to_it() {
    let catalog: Catalog<i64> = Catalog::new();
    catalog.register("a", plus_one()).unwrap();

    let view = catalog.select(["a"]);
    view.register("v", plus_one()).unwrap();

    assert!(view.has("v"));
    assert_eq!(view.call("v", vec![1]).unwrap().await.unwrap(), Outcome::One(2));
    assert!(!catalog.has("v"), "view-local entries do not propagate to the root");

    // Names are still unique against the root's full mapping.
    let err = view.register("a", plus_one()).unwrap_err();
    assert!(matches!(err, CatalogError::AlreadyRegistered(_)));
}

#[tokio::test]
async fn selecting_from_a_view_narrows_it() {
    let catalog: Catalog<i64> = Catalog::new();
    catalog.register("a", plus_one()).unwrap();
    catalog.register("b", plus_one()).unwrap();

    let wide = catalog.select(["a", "b"]);
    wide.register("v", plus_one()).unwrap();

    let narrow = wide.select(["b", "v", "missing"]);
    assert_eq!(
        narrow.event_names(),
        vec!["b".to_string(), "v".to_string()]
    );

    narrow.remove(["b"]);
    assert!(!catalog.has("b"), "write-through deletion resolves to the root");
}
