//! Entity resolver behaviour over paused time: debouncing, stale lookups,
//! selection and teardown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use movie_sync::domain::{BearerToken, Paginated, Person, PersonKind};
use movie_sync::resolver::{EntityResolver, ResolverError, ResolverOptions, ResolverView};
use movie_sync::transport::mock::{create_channel_transport, Call, MockTransport, Reply};
use movie_sync::transport::TransportError;

fn people(names: &[&str]) -> Paginated<Person> {
    let data: Vec<Person> = names
        .iter()
        .enumerate()
        .map(|(i, name)| Person::new(format!("p{i}"), *name))
        .collect();
    let total = data.len() as u64;
    Paginated::new(data, 1, 1, total)
}

type Selections = Arc<Mutex<Vec<Person>>>;

fn resolver(
    transport: Arc<dyn movie_sync::transport::Transport>,
    kind: PersonKind,
    token: Option<BearerToken>,
) -> (EntityResolver, Selections) {
    let selections: Selections = Arc::default();
    let sink = selections.clone();
    let resolver = EntityResolver::new(
        transport,
        kind,
        token,
        Box::new(move |p| sink.lock().unwrap().push(p)),
        ResolverOptions::default(),
    );
    (resolver, selections)
}

fn token() -> Option<BearerToken> {
    Some(BearerToken::new("token"))
}

async fn settled(resolver: &EntityResolver) -> ResolverView {
    resolver
        .subscribe()
        .wait_for(|v| !v.loading && !v.results.is_empty())
        .await
        .expect("Resolver dropped")
        .clone()
}

/// Typing quickly issues one lookup, for the final text.
#[tokio::test(start_paused = true)]
async fn test_keystrokes_collapse_into_one_lookup() {
    let mock = MockTransport::new();
    mock.expect_persons().return_ok(people(&["Christian Bale"]));
    let (resolver, _) = resolver(Arc::new(mock.clone()), PersonKind::Actor, token());

    resolver.focus();
    for text in ["bat", "batm", "batma", "batman"] {
        resolver.input(text);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(mock.calls().is_empty(), "Lookup issued before the quiet period");

    let view = settled(&resolver).await;
    assert_eq!(view.results[0].name, "Christian Bale");
    assert_eq!(
        mock.calls(),
        vec![Call::ListPersons {
            kind: PersonKind::Actor,
            query: Some("batman".into()),
        }]
    );
    mock.verify();
}

/// A slow lookup for an older query never replaces newer results.
#[tokio::test(start_paused = true)]
async fn test_stale_lookup_is_discarded() {
    let (transport, mut calls) = create_channel_transport(4);
    let (resolver, _) = resolver(Arc::new(transport), PersonKind::Actor, token());

    resolver.input("bat");
    let slow = calls.recv().await.expect("Expected lookup for 'bat'");
    assert_eq!(
        slow.call,
        Call::ListPersons {
            kind: PersonKind::Actor,
            query: Some("bat".into()),
        }
    );

    resolver.input("man");
    let fast = calls.recv().await.expect("Expected lookup for 'man'");
    fast.respond(Reply::Persons(Ok(people(&["Manny"]))));
    let view = settled(&resolver).await;
    assert_eq!(view.results[0].name, "Manny");

    slow.respond(Reply::Persons(Ok(people(&["Batty"]))));
    tokio::time::sleep(Duration::from_millis(10)).await;
    let view = resolver.view();
    assert_eq!(view.query, "man");
    assert_eq!(view.results.len(), 1);
    assert_eq!(view.results[0].name, "Manny");
}

#[tokio::test(start_paused = true)]
async fn test_select_forwards_person_and_resets() {
    let mock = MockTransport::new();
    mock.expect_persons()
        .return_ok(people(&["Emma Thomas", "Charles Roven"]));
    let (resolver, selections) = resolver(Arc::new(mock.clone()), PersonKind::Producer, token());

    resolver.input("thomas");
    settled(&resolver).await;

    let chosen = resolver.select("p0").expect("Failed to select");
    assert_eq!(chosen.name, "Emma Thomas");
    assert_eq!(*selections.lock().unwrap(), vec![chosen]);

    let view = resolver.view();
    assert_eq!(view.query, "");
    assert!(!view.open);
    assert!(view.results.is_empty());
    assert_eq!(view.selected_name, "Emma Thomas");

    assert_eq!(
        resolver.select("p1"),
        Err(ResolverError::NotInResults("p1".into()))
    );
    assert_eq!(selections.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_click_outside_keeps_query_and_focus_reopens() {
    let mock = MockTransport::new();
    mock.expect_persons().return_ok(people(&["Michael Caine"]));
    let (resolver, _) = resolver(Arc::new(mock.clone()), PersonKind::Actor, token());

    resolver.input("caine");
    settled(&resolver).await;

    resolver.click_outside();
    let view = resolver.view();
    assert!(!view.open);
    assert!(view.results.is_empty());
    assert_eq!(view.query, "caine");

    resolver.focus();
    let view = resolver.view();
    assert!(view.open);
    assert_eq!(view.results[0].name, "Michael Caine");
}

#[tokio::test(start_paused = true)]
async fn test_failed_lookup_shows_no_results() {
    let mock = MockTransport::new();
    mock.expect_persons().return_err(TransportError::Status {
        status: 500,
        message: "Failed to fetch actors".into(),
    });
    let (resolver, _) = resolver(Arc::new(mock.clone()), PersonKind::Actor, token());

    resolver.input("nobody");
    tokio::time::sleep(Duration::from_millis(400)).await;

    let view = resolver.view();
    assert!(!view.loading);
    assert!(view.open);
    assert!(view.results.is_empty());
    mock.verify();
}

/// Clearing the text before the timer fires issues nothing.
#[tokio::test(start_paused = true)]
async fn test_clearing_query_cancels_pending_lookup() {
    let mock = MockTransport::new();
    let (resolver, _) = resolver(Arc::new(mock.clone()), PersonKind::Actor, token());

    resolver.input("nol");
    tokio::time::sleep(Duration::from_millis(100)).await;
    resolver.input("   ");
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert!(mock.calls().is_empty());
    assert!(resolver.view().results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unmount_discards_in_flight_lookup() {
    let (transport, mut calls) = create_channel_transport(4);
    let (resolver, _) = resolver(Arc::new(transport), PersonKind::Actor, token());
    let mut views = resolver.subscribe();

    resolver.input("hardy");
    let pending = calls.recv().await.unwrap();
    resolver.unmount();

    pending.respond(Reply::Persons(Ok(people(&["Tom Hardy"]))));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let view = views.borrow_and_update().clone();
    assert!(view.results.is_empty());
    assert!(!view.open);
    assert!(!view.loading);
    assert_eq!(view.query, "");
}

#[tokio::test(start_paused = true)]
async fn test_no_token_means_no_request() {
    let mock = MockTransport::new();
    let (resolver, _) = resolver(Arc::new(mock.clone()), PersonKind::Actor, None);

    resolver.input("anyone");
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(mock.calls().is_empty());
    let view = resolver.view();
    assert!(view.results.is_empty());
    assert!(!view.loading);
}

#[tokio::test]
async fn test_initial_view() {
    let mock = MockTransport::new();
    let resolver = EntityResolver::new(
        Arc::new(mock),
        PersonKind::Producer,
        token(),
        Box::new(|_| {}),
        ResolverOptions {
            selected_name: Some("Emma Thomas".into()),
            ..ResolverOptions::default()
        },
    );

    let view = resolver.view();
    assert_eq!(view.placeholder, "Search producer...");
    assert_eq!(view.selected_name, "Emma Thomas");
    assert_eq!(view.query, "");
    assert!(!view.open);
    assert_eq!(resolver.kind(), PersonKind::Producer);
}
