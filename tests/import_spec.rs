use speculate2::speculate;
use workboard::color::get_color;
use workboard::import::*;
use workboard::models::*;
use workboard::view::{project, Bucket, SortMode, TaskView, ViewMode, ViewQuery};

const HEADER: &str = "Task ID,Name,Section/Column,Release Version,Feature Area,Due Date,Parent task,Assignee,Notes";

fn csv(rows: &[&str]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

fn names(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.name.as_str()).collect()
}

speculate! {
    before {
        let importer = Importer::new(1_700_000_000_000);
    }

    describe "parsing" {
        it "rejects a file with only a header row" {
            let err = importer.import(HEADER).unwrap_err();
            assert_eq!(err, ImportError::TooFewRows(1));
        }

        it "handles quoted fields, escaped quotes and CRLF" {
            let text = "Name,Notes\r\n\"Fix \"\"login\"\", again\",\"multi\nline\"\r\n";
            let doc = importer.import(text).expect("import failed");
            assert_eq!(doc.tasks[0].name, "Fix \"login\", again");
            assert_eq!(doc.tasks[0].notes.as_deref(), Some("multi\nline"));
        }

        it "reads a file that starts with a byte order mark" {
            let doc = importer
                .import("\u{feff}Name,Release Version\nAlpha,R1\nBeta,R1\n")
                .expect("import failed");
            assert_eq!(names(&doc.tasks), vec!["Alpha", "Beta"]);
            assert_eq!(doc.releases.len(), 1);
            assert_eq!(doc.releases[0].name, "R1");
        }

        it "accepts a file without a trailing newline" {
            let doc = importer.import("Name\nOnly task").expect("import failed");
            assert_eq!(names(&doc.tasks), vec!["Only task"]);
        }
    }

    describe "records" {
        it "creates one root task per named row without parents" {
            let text = csv(&[
                ",Alpha,Not Started,R1,Core,,,,",
                ",Beta,In Progress,R1,Core,,,,",
                ",Gamma,Complete,R2,UI,,,,",
            ]);
            let doc = importer.import(&text).expect("import failed");
            assert_eq!(doc.tasks.len(), 3);
            assert!(doc.tasks.iter().all(|t| t.subtasks.is_empty()));
        }

        it "skips rows with an empty name without shifting generated ids" {
            let with_blank = csv(&[",Alpha,,,,,,,", ",,,,,,,,", ",Beta,,,,,,,"]);
            let without_blank = csv(&[",Alpha,,,,,,,", ",Beta,,,,,,,"]);

            let a = importer.import(&with_blank).expect("import failed");
            let b = importer.import(&without_blank).expect("import failed");

            assert_eq!(names(&a.tasks), vec!["Alpha", "Beta"]);
            let ids = |d: &Document| d.tasks.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
            assert_eq!(ids(&a), ids(&b));
            assert_eq!(ids(&a), vec!["task-1700000000000-0", "task-1700000000000-1"]);
        }

        it "keeps ids from the Task ID column" {
            let doc = importer.import(&csv(&["T-9,Alpha,,,,,,,"])).expect("import failed");
            assert_eq!(doc.tasks[0].id, "T-9");
        }

        it "applies defaults for missing release, feature area and status" {
            let doc = importer.import("Name\nLonely\n").expect("import failed");
            let task = &doc.tasks[0];
            assert_eq!(task.status, "Not Started");
            assert_eq!(doc.release_of(task).unwrap().name, "Unassigned Release");
            assert_eq!(doc.feature_area_of(task).unwrap().name, "Unassigned Feature Area");
        }

        it "joins Notes, Comment and Comments with blank lines" {
            let text = "Name,Comments,Notes,Comment\nTask,third,first,second\n";
            let doc = importer.import(text).expect("import failed");
            assert_eq!(doc.tasks[0].notes.as_deref(), Some("first\n\nsecond\n\nthird"));
        }

        it "keeps due date and assignee on the task" {
            let doc = importer
                .import(&csv(&[",Alpha,,R1,,2024-03-01,,sam,"]))
                .expect("import failed");
            assert_eq!(doc.tasks[0].due_date.as_deref(), Some("2024-03-01"));
            assert_eq!(doc.tasks[0].assignee.as_deref(), Some("sam"));
        }
    }

    describe "releases and feature areas" {
        it "collapses rows sharing a release and keeps the later date" {
            let text = csv(&[
                ",Alpha,,R1,Core,2024-01-01,,,",
                ",Beta,,R1,Core,2024-06-01,,,",
            ]);
            let doc = importer.import(&text).expect("import failed");
            assert_eq!(doc.releases.len(), 1);
            assert_eq!(doc.releases[0].name, "R1");
            assert_eq!(doc.releases[0].date.as_deref(), Some("2024-06-01"));
        }

        it "does not move the release date earlier" {
            let text = csv(&[
                ",Alpha,,R1,,2024-06-01,,,",
                ",Beta,,R1,,2024-01-01,,,",
            ]);
            let doc = importer.import(&text).expect("import failed");
            assert_eq!(doc.releases[0].date.as_deref(), Some("2024-06-01"));
        }

        it "numbers releases and feature areas in first-seen order" {
            let text = csv(&[
                ",Alpha,,R2,UI,,,,",
                ",Beta,,R1,Core,,,,",
                ",Gamma,,R2,Core,,,,",
            ]);
            let doc = importer.import(&text).expect("import failed");
            let releases: Vec<(&str, &str)> = doc.releases.iter().map(|r| (r.id.as_str(), r.name.as_str())).collect();
            assert_eq!(releases, vec![("release-1", "R2"), ("release-2", "R1")]);
            let areas: Vec<(&str, &str)> = doc.feature_areas.iter().map(|f| (f.id.as_str(), f.name.as_str())).collect();
            assert_eq!(areas, vec![("feature-1", "UI"), ("feature-2", "Core")]);
            assert_eq!(doc.tasks[2].release_id.as_deref(), Some("release-1"));
            assert_eq!(doc.tasks[2].feature_area_id.as_deref(), Some("feature-2"));
        }

        it "treats names case-sensitively" {
            let doc = importer
                .import(&csv(&[",Alpha,,r1,,,,,", ",Beta,,R1,,,,,"]))
                .expect("import failed");
            assert_eq!(doc.releases.len(), 2);
        }
    }

    describe "parent linkage" {
        it "nests a child under its named parent" {
            let doc = importer
                .import(&csv(&[",Parent,,,,,,,", ",Child,,,,,Parent,,"]))
                .expect("import failed");
            assert_eq!(names(&doc.tasks), vec!["Parent"]);
            assert_eq!(names(&doc.tasks[0].subtasks), vec!["Child"]);
        }

        it "gives the same tree when rows are reversed" {
            let doc = importer
                .import(&csv(&[",Child,,,,,Parent,,", ",Parent,,,,,,,"]))
                .expect("import failed");
            assert_eq!(names(&doc.tasks), vec!["Parent"]);
            assert_eq!(names(&doc.tasks[0].subtasks), vec!["Child"]);
        }

        it "keeps a task with an unknown parent at the root" {
            let doc = importer
                .import(&csv(&[",Orphan,,,,,Nobody,,", ",Other,,,,,,,"]))
                .expect("import failed");
            assert_eq!(names(&doc.tasks), vec!["Orphan", "Other"]);
        }

        it "keeps subtasks in row order" {
            let doc = importer
                .import(&csv(&[
                    ",Second,,,,,Parent,,",
                    ",Parent,,,,,,,",
                    ",First,,,,,Parent,,",
                ]))
                .expect("import failed");
            assert_eq!(names(&doc.tasks[0].subtasks), vec!["Second", "First"]);
        }
    }

    describe "round trip" {
        it "preserves entity names and statuses through export and re-import" {
            let text = csv(&[
                ",Alpha,In Progress,R1,Core,2024-01-01,,sam,\"a, b\"",
                ",Beta,Completed,R2,UI,2024-06-01,,,",
                ",Gamma,Blocked,R1,UI,,Alpha,,",
            ]);
            let first = importer.import(&text).expect("import failed");
            let exported = export_csv(&first).expect("export failed");
            let second = Importer::new(2).import(&exported).expect("re-import failed");

            let summary = |d: &Document| {
                let mut tasks: Vec<(String, String)> = Vec::new();
                for task in &d.tasks {
                    task.walk(&mut |t| tasks.push((t.name.clone(), t.status.clone())));
                }
                let mut releases: Vec<String> = d.releases.iter().map(|r| r.name.clone()).collect();
                releases.sort();
                let mut areas: Vec<String> = d.feature_areas.iter().map(|f| f.name.clone()).collect();
                areas.sort();
                (tasks, releases, areas)
            };
            assert_eq!(summary(&first), summary(&second));
            assert_eq!(second.tasks[0].subtasks[0].name, "Gamma");
            assert_eq!(second.tasks[0].notes.as_deref(), Some("a, b"));
        }
    }

    describe "colours" {
        it "derives the same colour for the same name" {
            let doc = importer.import(&csv(&[",Alpha,,R1,Core,,,,"])).expect("import failed");
            assert_eq!(get_color(&doc.releases[0].name), get_color("R1"));
            assert!(doc.releases[0].color.is_none());
        }
    }

    describe "release view" {
        it "groups imported statuses into ordered buckets" {
            let text = csv(&[
                ",A,Not Started,R1,,,,,",
                ",B,Complete,R1,,,,,",
                ",C,In Progress,R1,,,,,",
                ",D,Completed,R1,,,,,",
                ",E,Blocked,R1,,,,,",
            ]);
            let doc = importer.import(&text).expect("import failed");
            let query = ViewQuery::new(ViewMode::ByRelease, SortMode::ReleaseDate, Some("release-1".to_string()));

            let TaskView::Grouped(buckets) = project(&doc, &query) else {
                panic!("expected grouped view");
            };
            let counts: Vec<(&str, usize)> = buckets
                .iter()
                .map(|b: &Bucket| (b.status.label(), b.tasks.len()))
                .collect();
            assert_eq!(
                counts,
                vec![("Not Started", 1), ("In Progress", 1), ("Complete", 2), ("Other", 1)]
            );
        }
    }
}
