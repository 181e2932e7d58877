//! Integration tests for file and folder operations.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;

use contenthub_access::AccessModule;
use contenthub_core::error::ErrorKind;
use contenthub_entity::{AccessFlags, ResourceState, ResourceType};

use helpers::path;

#[tokio::test]
async fn test_create_file_is_new_and_locked_by_creator() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;

    let file = repo.file(&alice, "/a.txt", b"hello").await;

    assert_eq!(file.state, ResourceState::New);
    assert_eq!(file.locked_by, Some(alice.user_id));
    assert_eq!(file.project_id, project.id);
    assert_eq!(file.length, 5);
    assert_eq!(file.content(), None);
}

#[tokio::test]
async fn test_read_after_write_returns_written_attributes() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    let brokers = repo.hub.resources();
    repo.file(&alice, "/a.txt", b"hello").await;

    // Warm the cache, then write through it.
    let mut header = brokers.read_file_header(&alice, &path("/a.txt")).await.unwrap();
    header.resource_type = ResourceType::Page;
    header.access_flags = AccessFlags::default_resource().without(AccessFlags::PUBLIC_READ);
    brokers.write_file_header(&alice, &header, true).await.unwrap();

    let reread = brokers.read_file_header(&alice, &path("/a.txt")).await.unwrap();
    assert_eq!(reread.resource_type, ResourceType::Page);
    assert!(!reread.access_flags.contains(AccessFlags::PUBLIC_READ));
    assert_eq!(reread.state, ResourceState::New);
}

#[tokio::test]
async fn test_header_reads_are_served_from_cache() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    repo.file(&alice, "/a.txt", b"hello").await;

    let brokers = repo.hub.resources();
    brokers.read_file_header(&alice, &path("/a.txt")).await.unwrap();
    let after_fill = repo.access.calls("read_resource");
    brokers.read_file_header(&alice, &path("/a.txt")).await.unwrap();
    brokers.read_file_header(&alice, &path("/a.txt")).await.unwrap();

    assert_eq!(repo.access.calls("read_resource"), after_fill);
}

#[tokio::test]
async fn test_returned_header_is_a_copy() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    repo.file(&alice, "/a.txt", b"hello").await;

    let brokers = repo.hub.resources();
    let mut first = brokers.read_file_header(&alice, &path("/a.txt")).await.unwrap();
    first.length = 999;
    first.locked_by = None;

    let second = brokers.read_file_header(&alice, &path("/a.txt")).await.unwrap();
    assert_eq!(second.length, 5);
    assert_eq!(second.locked_by, Some(alice.user_id));
}

#[tokio::test]
async fn test_folders_are_not_cached_by_header_reads() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    repo.folder(&alice, "/docs").await;

    let brokers = repo.hub.resources();
    let cache = repo.hub.caches().resources();
    brokers.read_folder(&alice, &path("/docs")).await.unwrap();
    assert!(cache.get(&path("/docs"), project.id).is_some());

    let header = brokers.read_file_header(&alice, &path("/docs")).await.unwrap();
    assert!(header.is_folder());
    assert!(cache.get(&path("/docs"), project.id).is_none());

    let before = repo.access.calls("read_resource");
    brokers.read_file_header(&alice, &path("/docs")).await.unwrap();
    assert_eq!(repo.access.calls("read_resource"), before + 1);
}

#[tokio::test]
async fn test_write_file_replaces_content_offline_only() {
    let repo = helpers::TestRepo::new().await;
    let first = repo.project("First").await;
    let alice = repo.editor("alice", first.id).await;
    repo.file(&alice, "/a.txt", b"v1").await;
    repo.publish(&alice).await;

    let second = repo.project("Second").await;
    let alice = alice.in_project(second.id);
    let brokers = repo.hub.resources();
    brokers.lock_resource(&alice, &path("/a.txt")).await.unwrap();

    let mut file = brokers.read_file(&alice, &path("/a.txt")).await.unwrap();
    file.set_content(Bytes::from_static(b"version two"));
    let written = brokers.write_file(&alice, &file).await.unwrap();
    assert_eq!(written.state, ResourceState::Changed);
    assert_eq!(written.length, 11);

    let offline = brokers.read_file(&alice, &path("/a.txt")).await.unwrap();
    assert_eq!(offline.content().unwrap().as_ref(), b"version two");
    let online = brokers
        .read_file(&repo.admin, &path("/a.txt"))
        .await
        .unwrap();
    assert_eq!(online.content().unwrap().as_ref(), b"v1");
    assert_eq!(online.state, ResourceState::Unchanged);
}

#[tokio::test]
async fn test_deleting_new_file_leaves_nothing_behind() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    repo.file(&alice, "/scratch.txt", b"tmp").await;

    let brokers = repo.hub.resources();
    brokers.delete_file(&alice, &path("/scratch.txt")).await.unwrap();

    let err = brokers
        .read_file_header(&alice, &path("/scratch.txt"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(
        repo.access
            .list_project_resources(project.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_deleting_published_file_tombstones_then_undeletes() {
    let repo = helpers::TestRepo::new().await;
    let first = repo.project("First").await;
    let alice = repo.editor("alice", first.id).await;
    repo.file(&alice, "/a.txt", b"v1").await;
    repo.publish(&alice).await;

    let second = repo.project("Second").await;
    let alice = alice.in_project(second.id);
    let brokers = repo.hub.resources();
    brokers.lock_resource(&alice, &path("/a.txt")).await.unwrap();
    brokers.delete_file(&alice, &path("/a.txt")).await.unwrap();

    let err = brokers
        .read_file_header(&alice, &path("/a.txt"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let listed = brokers
        .read_files_in_folder(&alice, &path("/"), true)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].state, ResourceState::Deleted);
    assert!(
        brokers
            .read_files_in_folder(&alice, &path("/"), false)
            .await
            .unwrap()
            .is_empty()
    );

    let restored = brokers
        .undelete_resource(&alice, &path("/a.txt"))
        .await
        .unwrap();
    assert_eq!(restored.state, ResourceState::Changed);
    let header = brokers.read_file_header(&alice, &path("/a.txt")).await.unwrap();
    assert_eq!(header.state, ResourceState::Changed);
}

#[tokio::test]
async fn test_writing_deleted_file_is_invalid_state() {
    let repo = helpers::TestRepo::new().await;
    let first = repo.project("First").await;
    let alice = repo.editor("alice", first.id).await;
    repo.file(&alice, "/a.txt", b"v1").await;
    repo.publish(&alice).await;

    let second = repo.project("Second").await;
    let alice = alice.in_project(second.id);
    let brokers = repo.hub.resources();
    let locked = brokers.lock_resource(&alice, &path("/a.txt")).await.unwrap();
    brokers.delete_file(&alice, &path("/a.txt")).await.unwrap();

    let mut edit = locked.clone();
    edit.resource_type = ResourceType::Page;
    for changed in [true, false] {
        let err = brokers
            .write_file_header(&alice, &edit, changed)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
    }

    let stored = repo
        .access
        .read_resource(second.id, &path("/a.txt"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, ResourceState::Deleted);
    assert_eq!(stored.resource_type, ResourceType::Plain);
}

#[tokio::test]
async fn test_writing_deleted_folder_is_invalid_state() {
    let repo = helpers::TestRepo::new().await;
    let first = repo.project("First").await;
    let alice = repo.editor("alice", first.id).await;
    repo.folder(&alice, "/docs").await;
    repo.publish(&alice).await;

    let second = repo.project("Second").await;
    let alice = alice.in_project(second.id);
    let brokers = repo.hub.resources();
    let mut locked = brokers.lock_resource(&alice, &path("/docs")).await.unwrap();
    brokers.delete_folder(&alice, &path("/docs")).await.unwrap();

    locked.access_flags = AccessFlags::default();
    let err = brokers
        .write_folder(&alice, &locked, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    let stored = repo
        .access
        .read_resource(second.id, &path("/docs"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, ResourceState::Deleted);
}

#[tokio::test]
async fn test_header_type_must_match_kind() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    let brokers = repo.hub.resources();

    let mut file = repo.file(&alice, "/a.txt", b"x").await;
    file.resource_type = ResourceType::Folder;
    let err = brokers
        .write_file_header(&alice, &file, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let mut folder = repo.folder(&alice, "/docs").await;
    folder.resource_type = ResourceType::Page;
    let err = brokers
        .write_folder(&alice, &folder, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let stored = repo
        .access
        .read_resource(project.id, &path("/a.txt"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.resource_type, ResourceType::Plain);
    let stored = repo
        .access
        .read_resource(project.id, &path("/docs"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.resource_type, ResourceType::Folder);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fills_never_outlive_a_write() {
    const TYPES: [ResourceType; 5] = [
        ResourceType::Plain,
        ResourceType::Binary,
        ResourceType::Link,
        ResourceType::Pointer,
        ResourceType::Page,
    ];

    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    let mut header = repo.file(&alice, "/a.txt", b"x").await;
    let brokers = repo.hub.resources().clone();
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let brokers = brokers.clone();
            let ctx = alice.clone();
            let stop = stop.clone();
            tokio::spawn(async move {
                while !stop.load(Ordering::Relaxed) {
                    brokers
                        .read_file_header(&ctx, &path("/a.txt"))
                        .await
                        .unwrap();
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for round in 0..200 {
        header.resource_type = TYPES[round % TYPES.len()];
        brokers
            .write_file_header(&alice, &header, false)
            .await
            .unwrap();
        let read = brokers
            .read_file_header(&alice, &path("/a.txt"))
            .await
            .unwrap();
        assert_eq!(
            read.resource_type, header.resource_type,
            "read after write {round} returned an older header"
        );
    }

    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.await.unwrap();
    }
}

#[tokio::test]
async fn test_same_path_is_isolated_between_projects() {
    let repo = helpers::TestRepo::new().await;
    let first = repo.project("First").await;
    let alice = repo.editor("alice", first.id).await;
    repo.file(&alice, "/a.txt", b"v1").await;
    repo.publish(&alice).await;

    let one = repo.project("One").await;
    let two = repo.project("Two").await;
    let in_one = alice.in_project(one.id);
    let in_two = alice.in_project(two.id);
    let brokers = repo.hub.resources();

    // Both projects cache their view of the path.
    brokers.read_file_header(&in_one, &path("/a.txt")).await.unwrap();
    brokers.read_file_header(&in_two, &path("/a.txt")).await.unwrap();

    let mut header = brokers.lock_resource(&in_one, &path("/a.txt")).await.unwrap();
    header.resource_type = ResourceType::Page;
    brokers.write_file_header(&in_one, &header, true).await.unwrap();

    let seen_in_one = brokers.read_file_header(&in_one, &path("/a.txt")).await.unwrap();
    let seen_in_two = brokers.read_file_header(&in_two, &path("/a.txt")).await.unwrap();
    assert_eq!(seen_in_one.state, ResourceState::Changed);
    assert_eq!(seen_in_one.resource_type, ResourceType::Page);
    assert_eq!(seen_in_two.state, ResourceState::Unchanged);
    assert_eq!(seen_in_two.resource_type, ResourceType::Plain);
    assert_eq!(seen_in_two.locked_by, None);
}

#[tokio::test]
async fn test_folder_with_live_children_cannot_be_deleted() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    repo.folder(&alice, "/docs").await;
    repo.file(&alice, "/docs/a.txt", b"x").await;

    let brokers = repo.hub.resources();
    let err = brokers.delete_folder(&alice, &path("/docs")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    brokers.delete_file(&alice, &path("/docs/a.txt")).await.unwrap();
    brokers.delete_folder(&alice, &path("/docs")).await.unwrap();
    let err = brokers.read_folder(&alice, &path("/docs")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_sub_folders_and_files_are_listed_separately() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    repo.folder(&alice, "/docs").await;
    repo.folder(&alice, "/docs/img").await;
    repo.file(&alice, "/docs/a.txt", b"x").await;
    repo.file(&alice, "/docs/b.txt", b"y").await;

    let brokers = repo.hub.resources();
    let folders = brokers
        .read_sub_folders(&alice, &path("/docs"), false)
        .await
        .unwrap();
    let files = brokers
        .read_files_in_folder(&alice, &path("/docs"), false)
        .await
        .unwrap();

    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].display_path(), "/docs/img/");
    let names: Vec<_> = files.iter().map(|f| f.path.name().to_string()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn test_rename_moves_content_and_drops_old_path() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    repo.file(&alice, "/draft.txt", b"body").await;

    let brokers = repo.hub.resources();
    brokers.read_file_header(&alice, &path("/draft.txt")).await.unwrap();
    let moved = brokers
        .rename_file(&alice, &path("/draft.txt"), &path("/final.txt"))
        .await
        .unwrap();
    assert_eq!(moved.state, ResourceState::New);

    assert!(
        repo.hub
            .caches()
            .resources()
            .get(&path("/draft.txt"), project.id)
            .is_none()
    );
    let err = brokers
        .read_file_header(&alice, &path("/draft.txt"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let file = brokers.read_file(&alice, &path("/final.txt")).await.unwrap();
    assert_eq!(file.content().unwrap().as_ref(), b"body");
}

#[tokio::test]
async fn test_create_in_online_project_is_rejected() {
    let repo = helpers::TestRepo::new().await;
    let err = repo
        .hub
        .resources()
        .create_folder(&repo.admin, &path("/direct"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_create_existing_path_conflicts() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    repo.folder(&alice, "/docs").await;

    let err = repo
        .hub
        .resources()
        .create_folder(&alice, &path("/docs"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_internal_resources_hidden_from_users() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    let brokers = repo.hub.resources();
    let mut file = repo.file(&alice, "/secret.txt", b"x").await;
    file.access_flags = file.access_flags.with(AccessFlags::INTERNAL);
    brokers.write_file_header(&alice, &file, true).await.unwrap();

    let err = brokers
        .read_file_header(&alice, &path("/secret.txt"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let internal = repo.admin.in_project(project.id);
    assert!(brokers.read_file_header(&internal, &path("/secret.txt")).await.is_ok());
}
