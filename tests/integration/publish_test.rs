//! Integration tests for publishing offline projects.

mod helpers;

use std::time::Duration;

use bytes::Bytes;

use contenthub_access::{AccessModule, Fault};
use contenthub_core::error::ErrorKind;
use contenthub_core::types::ProjectId;
use contenthub_entity::{Group, ProjectFlags, ResourceState, ResourceType};

use helpers::path;

#[tokio::test]
async fn test_publish_moves_new_resources_online() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Offline").await;
    assert_eq!(project.id, ProjectId(2));
    let alice = repo.editor("alice", project.id).await;
    repo.folder(&alice, "/docs").await;
    repo.file(&alice, "/docs/readme.txt", b"Welcome").await;

    let backup = repo
        .hub
        .resources()
        .publish_project(&alice)
        .await
        .unwrap();

    let online = repo
        .access
        .read_file_content(repo.online(), &path("/docs/readme.txt"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(online.state, ResourceState::Unchanged);
    assert_eq!(online.locked_by, None);
    assert_eq!(online.project_id, repo.online());
    assert_eq!(online.content().unwrap().as_ref(), b"Welcome");

    let folder = repo
        .access
        .read_resource(repo.online(), &path("/docs"))
        .await
        .unwrap()
        .unwrap();
    assert!(folder.is_folder());
    assert_eq!(folder.state, ResourceState::Unchanged);

    assert!(
        repo.access
            .list_project_resources(project.id)
            .await
            .unwrap()
            .is_empty()
    );

    assert_eq!(backup.project_id(), project.id);
    assert_eq!(backup.publisher_name(), "alice");
    assert_eq!(backup.resources(), &[path("/docs"), path("/docs/readme.txt")]);

    let history = repo
        .hub
        .projects()
        .read_backup_resources(backup.version())
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    let readme = history
        .iter()
        .find(|r| r.path() == &path("/docs/readme.txt"))
        .unwrap();
    assert_eq!(readme.state(), ResourceState::New);
    assert_eq!(readme.content().as_ref(), b"Welcome");
    assert_eq!(readme.owner_name(), "alice");
    assert_eq!(readme.group_name(), "Editors");
}

#[tokio::test]
async fn test_offline_project_sees_published_content() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Offline").await;
    let alice = repo.editor("alice", project.id).await;
    repo.file(&alice, "/a.txt", b"v1").await;

    // Cached offline view before the publish.
    let before = repo
        .hub
        .resources()
        .read_file_header(&alice, &path("/a.txt"))
        .await
        .unwrap();
    assert_eq!(before.state, ResourceState::New);

    repo.publish(&alice).await;

    let after = repo
        .hub
        .resources()
        .read_file_header(&alice, &path("/a.txt"))
        .await
        .unwrap();
    assert_eq!(after.state, ResourceState::Unchanged);
    assert_eq!(after.locked_by, None);
}

#[tokio::test]
async fn test_publish_applies_changes_and_deletions() {
    let repo = helpers::TestRepo::new().await;
    let first = repo.project("First").await;
    let alice = repo.editor("alice", first.id).await;
    repo.file(&alice, "/keep.txt", b"v1").await;
    repo.file(&alice, "/drop.txt", b"old").await;
    repo.file(&alice, "/touch.txt", b"same").await;
    repo.publish(&alice).await;

    let second = repo.project("Second").await;
    let alice = alice.in_project(second.id);
    let brokers = repo.hub.resources();
    brokers.lock_resource(&alice, &path("/keep.txt")).await.unwrap();
    let mut keep = brokers.read_file(&alice, &path("/keep.txt")).await.unwrap();
    keep.set_content(Bytes::from_static(b"v2"));
    brokers.write_file(&alice, &keep).await.unwrap();
    brokers.lock_resource(&alice, &path("/drop.txt")).await.unwrap();
    brokers.delete_file(&alice, &path("/drop.txt")).await.unwrap();
    // Locked but never modified.
    brokers.lock_resource(&alice, &path("/touch.txt")).await.unwrap();

    let backup = brokers.publish_project(&alice).await.unwrap();
    // Promotions are recorded before purges.
    assert_eq!(backup.resources(), &[path("/keep.txt"), path("/drop.txt")]);

    let online = repo.online();
    let kept = repo
        .access
        .read_file_content(online, &path("/keep.txt"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.content().unwrap().as_ref(), b"v2");
    assert_eq!(kept.state, ResourceState::Unchanged);
    assert!(
        repo.access
            .read_resource(online, &path("/drop.txt"))
            .await
            .unwrap()
            .is_none()
    );
    let touched = repo
        .access
        .read_resource(online, &path("/touch.txt"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(touched.locked_by, None);
    assert!(
        repo.access
            .list_project_resources(second.id)
            .await
            .unwrap()
            .is_empty()
    );

    let history = repo
        .hub
        .projects()
        .read_backup_resources(backup.version())
        .await
        .unwrap();
    let dropped = history
        .iter()
        .find(|r| r.path() == &path("/drop.txt"))
        .unwrap();
    assert_eq!(dropped.state(), ResourceState::Deleted);
    assert_eq!(dropped.content().as_ref(), b"old");
}

#[tokio::test]
async fn test_publish_unlocks_project_and_records_publisher() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Offline").await;
    let alice = repo.editor("alice", project.id).await;
    repo.file(&alice, "/a.txt", b"v1").await;
    repo.publish(&alice).await;

    let stored = repo.hub.projects().read_project(project.id).await.unwrap();
    assert_eq!(stored.flags, ProjectFlags::Unlocked);
    assert_eq!(stored.published_by, Some(alice.user_id));
    assert!(stored.published_at.is_some());

    let versions = repo.hub.projects().read_backup_projects().await.unwrap();
    assert_eq!(versions.len(), 1);
    let err = repo
        .hub
        .projects()
        .read_backup_project(versions[0].version() + 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_only_managers_publish() {
    let repo = helpers::TestRepo::new().await;
    let principals = repo.hub.principals();
    let managers = principals
        .add_group(&repo.admin, &Group::new("Managers", None))
        .await
        .unwrap();
    let project = repo
        .hub
        .projects()
        .create_project(&repo.admin, "Managed", "", repo.editors.id, managers.id)
        .await
        .unwrap();

    let alice = repo.editor("alice", project.id).await;
    repo.file(&alice, "/a.txt", b"v1").await;
    let err = repo
        .hub
        .resources()
        .publish_project(&alice)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    repo.user("carol", &[managers.id]).await;
    let carol = repo.ctx("carol", project.id).await;
    repo.publish(&carol).await;
    assert!(
        repo.access
            .read_resource(repo.online(), &path("/a.txt"))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_online_project_cannot_be_published() {
    let repo = helpers::TestRepo::new().await;
    let err = repo
        .hub
        .resources()
        .publish_project(&repo.admin)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_locked_project_rejects_changes() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Offline").await;
    let alice = repo.editor("alice", project.id).await;

    let mut locked = repo.hub.projects().read_project(project.id).await.unwrap();
    locked.flags = ProjectFlags::Locked;
    repo.hub
        .projects()
        .write_project(&repo.admin, &locked)
        .await
        .unwrap();

    let err = repo
        .hub
        .resources()
        .create_folder(&alice, &path("/docs"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test(start_paused = true)]
async fn test_write_in_flight_when_publish_starts_is_published() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    repo.file(&alice, "/a.txt", b"a").await;

    let created = repo.access.calls("create_resource");
    repo.access
        .inject("create_resource", Fault::Delay(Duration::from_millis(100)));
    let writer = {
        let brokers = repo.hub.resources().clone();
        let ctx = alice.clone();
        tokio::spawn(async move {
            brokers
                .create_file(
                    &ctx,
                    &path("/b.txt"),
                    ResourceType::Plain,
                    Bytes::from_static(b"b"),
                )
                .await
        })
    };
    // Wait until the writer is inside the store call.
    while repo.access.calls("create_resource") == created {
        tokio::task::yield_now().await;
    }

    repo.publish(&alice).await;
    writer.await.unwrap().unwrap();
    repo.access.clear_faults();

    let offline = repo
        .access
        .list_project_resources(project.id)
        .await
        .unwrap();
    assert!(offline.is_empty());
    let online = repo
        .access
        .read_resource(repo.online(), &path("/b.txt"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(online.state, ResourceState::Unchanged);
}
