use chrono::Utc;
use coursepath::db::Database;
use coursepath::error::Entity;
use coursepath::models::*;
use coursepath::{Engine, EngineConfig, Error};
use speculate2::speculate;

fn create_test_course(engine: &Engine) -> Course {
    engine
        .create_course(CreateCourseInput {
            title: "Test Course".to_string(),
        })
        .expect("Failed to create course")
}

/// Module > (A, B) with the path A -> B.
fn build_structure(engine: &Engine, course: &Course) -> (Item, Item, Item) {
    let module = engine
        .create_folder(course, CreateFolderInput {
            parent_id: None,
            name: "Module".to_string(),
        })
        .expect("Failed to create folder");
    let a = engine
        .create_item(course, CreateItemInput {
            parent_id: Some(module.id),
            name: "A".to_string(),
            leaf_payload_ref: 100,
        })
        .expect("Failed to create item");
    let b = engine
        .create_item(course, CreateItemInput {
            parent_id: Some(module.id),
            name: "B".to_string(),
            leaf_payload_ref: 200,
        })
        .expect("Failed to create item");
    engine
        .create_relations(course, &[RelationInput::start(a.id), RelationInput::link(a.id, b.id)])
        .expect("Failed to create relations");
    (module, a, b)
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
        let engine = Engine::new(db, EngineConfig::default());
    }

    describe "courses" {
        describe "create_course" {
            it "creates a course with a generated id" {
                let course = engine.create_course(CreateCourseInput {
                    title: "Intro to Rust".to_string(),
                }).expect("Failed to create course");

                assert!(course.id > 0);
                assert_eq!(course.title, "Intro to Rust");
            }

            it "rejects an empty title" {
                let result = engine.create_course(CreateCourseInput { title: "".to_string() });

                assert!(matches!(result, Err(Error::Validation(_))));
            }
        }

        describe "course" {
            it "returns not found for a missing course" {
                let result = engine.course(999);

                assert!(matches!(result, Err(Error::NotFound { id: 999, .. })));
            }
        }

        describe "list_courses" {
            it "lists courses by title" {
                engine.create_course(CreateCourseInput { title: "Zig".to_string() }).unwrap();
                engine.create_course(CreateCourseInput { title: "Ada".to_string() }).unwrap();

                let titles: Vec<String> = engine
                    .list_courses()
                    .unwrap()
                    .into_iter()
                    .map(|c| c.title)
                    .collect();

                assert_eq!(titles, vec!["Ada", "Zig"]);
            }
        }
    }

    describe "snapshots" {
        before {
            let course = create_test_course(&engine);
            let (module, a, b) = build_structure(&engine, &course);
        }

        describe "create_snapshot" {
            it "starts as a draft at version 1" {
                let snapshot = engine.create_snapshot(&course).unwrap();

                assert_eq!(snapshot.course_id, course.id);
                assert_eq!(snapshot.version, 1);
                assert_eq!(snapshot.status, SnapshotStatus::Draft);
            }

            it "increments the version per course" {
                engine.create_snapshot(&course).unwrap();
                let second = engine.create_snapshot(&course).unwrap();

                assert_eq!(second.version, 2);
                assert_eq!(engine.list_snapshots(course.id).unwrap().len(), 2);
            }

            it "copies the tree with fresh ids" {
                let snapshot = engine.create_snapshot(&course).unwrap();

                let tree = engine.hierarchy(&snapshot).unwrap();
                assert_eq!(tree.len(), 1);
                assert_eq!(tree[0].item.name, "Module");
                assert_ne!(tree[0].item.id, module.id);
                assert_eq!(tree[0].item.container_kind, ContainerKind::Snapshot);

                let leaves: Vec<(String, u32, Option<i64>)> = tree[0]
                    .children
                    .iter()
                    .map(|n| (n.item.name.clone(), n.item.depth, n.item.leaf_payload_ref))
                    .collect();
                assert_eq!(leaves, vec![
                    ("A".to_string(), 1, Some(100)),
                    ("B".to_string(), 1, Some(200)),
                ]);
                assert!(tree[0].children.iter().all(|n| n.item.parent_id == Some(tree[0].item.id)));
            }

            it "copies the learning path onto the new items" {
                let snapshot = engine.create_snapshot(&course).unwrap();

                let path = engine.relations(&snapshot).unwrap();
                let names: Vec<&str> = path.items.iter().map(|e| e.name.as_str()).collect();
                assert_eq!(names, vec!["A", "B"]);
                assert!(path.items.iter().all(|e| e.item_id != a.id && e.item_id != b.id));
            }

            it "is independent of later course edits" {
                let snapshot = engine.create_snapshot(&course).unwrap();

                engine.rename_item(&course, a.id, "A renamed").unwrap();

                let path = engine.relations(&snapshot).unwrap();
                assert_eq!(path.items[0].name, "A");
            }
        }

        describe "editability" {
            it "allows edits while the snapshot is a draft" {
                let snapshot = engine.create_snapshot(&course).unwrap();
                let tree = engine.hierarchy(&snapshot).unwrap();

                let renamed = engine.rename_item(&snapshot, tree[0].item.id, "Module v2").unwrap();

                assert_eq!(renamed.name, "Module v2");
            }

            it "freezes the structure once the snapshot leaves draft" {
                let snapshot = engine.create_snapshot(&course).unwrap();
                let active = engine.set_snapshot_status(snapshot.id, SnapshotStatus::Active).unwrap();
                let tree = engine.hierarchy(&active).unwrap();

                let rename = engine.rename_item(&active, tree[0].item.id, "Nope");
                let auto = engine.create_auto_relations(&active);

                assert!(matches!(rename, Err(Error::ContainerNotEditable(_))));
                assert!(matches!(auto, Err(Error::ContainerNotEditable(_))));
                assert_eq!(engine.relations(&active).unwrap().items.len(), 2);
            }

            it "rejects writes through a draft handle after the snapshot is frozen" {
                let draft = engine.create_snapshot(&course).unwrap();
                engine.set_snapshot_status(draft.id, SnapshotStatus::Active).unwrap();

                let create = engine.create_folder(&draft, CreateFolderInput {
                    parent_id: None,
                    name: "Late addition".to_string(),
                });
                let auto = engine.create_auto_relations(&draft);

                assert!(matches!(create, Err(Error::ContainerNotEditable(_))));
                assert!(matches!(auto, Err(Error::ContainerNotEditable(_))));
                assert_eq!(engine.hierarchy(&draft).unwrap().len(), 1);
                assert_eq!(engine.relations(&draft).unwrap().items.len(), 2);
            }

            it "accepts writes through a frozen handle once the snapshot is a draft again" {
                let snapshot = engine.create_snapshot(&course).unwrap();
                let active = engine.set_snapshot_status(snapshot.id, SnapshotStatus::Active).unwrap();
                engine.set_snapshot_status(snapshot.id, SnapshotStatus::Draft).unwrap();

                let folder = engine.create_folder(&active, CreateFolderInput {
                    parent_id: None,
                    name: "Reopened".to_string(),
                }).unwrap();

                assert_eq!(folder.container_id, snapshot.id);
                assert_eq!(engine.hierarchy(&snapshot).unwrap().len(), 2);
            }

            it "reports a missing snapshot as not found" {
                let result = engine.set_snapshot_status(999, SnapshotStatus::Archived);

                assert!(matches!(result, Err(Error::NotFound { id: 999, .. })));
            }
        }
    }

    describe "missing containers" {
        before {
            let ghost_course = Course {
                id: 999,
                title: "Ghost".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            let ghost_snapshot = Snapshot {
                id: 999,
                course_id: 999,
                version: 1,
                status: SnapshotStatus::Draft,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
        }

        it "rejects items for a course that was never stored" {
            let result = engine.create_folder(&ghost_course, CreateFolderInput {
                parent_id: None,
                name: "Orphan".to_string(),
            });

            assert!(matches!(result, Err(Error::NotFound { entity: Entity::Course, id: 999 })));
        }

        it "rejects items for a snapshot that was never stored" {
            let result = engine.create_item(&ghost_snapshot, CreateItemInput {
                parent_id: None,
                name: "Orphan".to_string(),
                leaf_payload_ref: 1,
            });

            assert!(matches!(result, Err(Error::NotFound { entity: Entity::Snapshot, id: 999 })));
        }

        it "reports reads of a missing container as not found" {
            assert!(matches!(
                engine.hierarchy(&ghost_course),
                Err(Error::NotFound { entity: Entity::Course, .. })
            ));
            assert!(matches!(
                engine.relations(&ghost_snapshot),
                Err(Error::NotFound { entity: Entity::Snapshot, .. })
            ));
        }

        it "refuses to publish a course that was never stored" {
            let result = engine.create_snapshot(&ghost_course);

            assert!(matches!(result, Err(Error::NotFound { entity: Entity::Course, id: 999 })));
            assert!(engine.list_snapshots(999).unwrap().is_empty());
        }
    }

    describe "on-disk database" {
        it "persists structure across reopen" {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("coursepath.db");

            let course_id = {
                let db = Database::open(path.clone()).unwrap();
                db.migrate().unwrap();
                let engine = Engine::new(db, EngineConfig::default());
                let course = create_test_course(&engine);
                build_structure(&engine, &course);
                course.id
            };

            let db = Database::open(path).unwrap();
            db.migrate().unwrap();
            let engine = Engine::new(db, EngineConfig::default());
            let course = engine.course(course_id).unwrap();

            let names: Vec<String> = engine
                .relations(&course)
                .unwrap()
                .items
                .into_iter()
                .map(|e| e.name)
                .collect();
            assert_eq!(names, vec!["A", "B"]);
        }
    }
}
