//! Integration tests for the project broker.

mod helpers;

use contenthub_core::error::ErrorKind;
use contenthub_core::types::ProjectId;

use helpers::path;

#[tokio::test]
async fn test_read_project_is_served_from_cache() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let projects = repo.hub.projects();

    let first = projects.read_project(project.id).await.unwrap();
    let after_fill = repo.access.calls("read_project");
    let second = projects.read_project(project.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(repo.access.calls("read_project"), after_fill);
}

#[tokio::test]
async fn test_write_project_invalidates() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let projects = repo.hub.projects();
    projects.read_project(project.id).await.unwrap();

    let mut edited = project.clone();
    edited.description = "Spring campaign".to_string();
    projects.write_project(&repo.admin, &edited).await.unwrap();

    let reread = projects.read_project(project.id).await.unwrap();
    assert_eq!(reread.description, "Spring campaign");
}

#[tokio::test]
async fn test_project_managers_may_write() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;

    let mut edited = project.clone();
    edited.description = "Edited by a manager".to_string();
    let written = repo
        .hub
        .projects()
        .write_project(&alice, &edited)
        .await
        .unwrap();
    assert_eq!(written.description, "Edited by a manager");
}

#[tokio::test]
async fn test_non_managers_may_not_write() {
    let repo = helpers::TestRepo::new().await;
    let outsiders = repo
        .hub
        .principals()
        .add_group(&repo.admin, &contenthub_entity::Group::new("Outsiders", None))
        .await
        .unwrap();
    let project = repo
        .hub
        .projects()
        .create_project(&repo.admin, "Closed", "", outsiders.id, outsiders.id)
        .await
        .unwrap();
    let alice = repo.editor("alice", project.id).await;

    let err = repo
        .hub
        .projects()
        .write_project(&alice, &project)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_delete_project_drops_its_resources() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    repo.file(&alice, "/a.txt", b"x").await;
    repo.hub
        .resources()
        .read_file_header(&alice, &path("/a.txt"))
        .await
        .unwrap();

    repo.hub
        .projects()
        .delete_project(&repo.admin, project.id)
        .await
        .unwrap();

    assert!(repo.hub.caches().resources().is_empty());
    let err = repo
        .hub
        .projects()
        .read_project(project.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = repo
        .hub
        .resources()
        .read_file_header(&alice, &path("/a.txt"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_online_project_cannot_be_deleted() {
    let repo = helpers::TestRepo::new().await;
    let err = repo
        .hub
        .projects()
        .delete_project(&repo.admin, repo.online())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert!(repo.hub.projects().online_project().await.is_ok());
}

#[tokio::test]
async fn test_read_all_projects_lists_online_first() {
    let repo = helpers::TestRepo::new().await;
    let b = repo.project("B").await;
    let a = repo.project("A").await;

    let ids: Vec<ProjectId> = repo
        .hub
        .projects()
        .read_all_projects()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![repo.online(), b.id, a.id]);
}

#[tokio::test]
async fn test_only_admins_create_and_delete_projects() {
    let repo = helpers::TestRepo::new().await;
    let project = repo.project("Work").await;
    let alice = repo.editor("alice", project.id).await;
    let projects = repo.hub.projects();

    let err = projects
        .create_project(&alice, "Mine", "", repo.editors.id, repo.editors.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let err = projects.delete_project(&alice, project.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let err = projects
        .create_project(&repo.admin, "  ", "", repo.editors.id, repo.editors.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_project_names_are_unique() {
    let repo = helpers::TestRepo::new().await;
    repo.project("Work").await;
    let err = repo
        .hub
        .projects()
        .create_project(&repo.admin, "Work", "", repo.editors.id, repo.editors.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}
