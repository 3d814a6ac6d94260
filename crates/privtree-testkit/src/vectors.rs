//! Scenario vectors: fixed mutation sequences with expected answers.
//!
//! Any implementation of the privilege tree should answer every expectation
//! of every scenario the same way.

use privtree_core::{Privilege, PrivilegeTree};

use crate::fixtures::path;

/// One step of a scenario. A blank path means the global scope.
#[derive(Debug, Clone)]
pub enum Step {
    Grant(&'static str, Privilege),
    Revoke(&'static str, Privilege),
    SetAll,
    ClearAll,
    /// Union with the tree the nested steps build.
    Merge(Vec<Step>),
    /// Difference with the tree the nested steps build.
    Subtract(Vec<Step>),
}

/// An expected answer to `contain(path, privilege)`.
#[derive(Debug, Clone)]
pub struct Expectation {
    pub path: &'static str,
    pub privilege: Privilege,
    pub held: bool,
}

/// A named scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Human-readable name for the scenario.
    pub name: &'static str,
    /// Mutations applied to an empty tree, in order.
    pub steps: Vec<Step>,
    /// Answers expected afterwards.
    pub expect: Vec<Expectation>,
}

impl Scenario {
    /// Apply the steps to a fresh tree.
    pub fn build(&self) -> PrivilegeTree {
        build_steps(&self.steps)
    }
}

fn build_steps(steps: &[Step]) -> PrivilegeTree {
    let mut tree = PrivilegeTree::new();
    for step in steps {
        match step {
            Step::Grant(resource, p) => {
                let resource = path(resource);
                if resource.is_empty() {
                    tree.add_global(*p);
                } else {
                    tree.add(&resource, *p);
                }
            }
            Step::Revoke(resource, p) => {
                let resource = path(resource);
                if resource.is_empty() {
                    tree.delete_global(*p);
                } else {
                    tree.delete(&resource, *p);
                }
            }
            Step::SetAll => tree.set_all(),
            Step::ClearAll => tree.clear_all(),
            Step::Merge(nested) => tree.union_with(&build_steps(nested)),
            Step::Subtract(nested) => tree.different_with(&build_steps(nested)),
        }
    }
    tree
}

fn expect(path: &'static str, privilege: Privilege, held: bool) -> Expectation {
    Expectation {
        path,
        privilege,
        held,
    }
}

/// Get all scenarios.
pub fn all_scenarios() -> Vec<Scenario> {
    use Privilege as P;

    vec![
        Scenario {
            name: "global grant reaches every resource",
            steps: vec![Step::Grant("", P::GRANT | P::INSERT)],
            expect: vec![
                expect("", P::GRANT | P::INSERT, true),
                expect("anything", P::GRANT | P::INSERT, true),
                expect("anything", P::SELECT, false),
            ],
        },
        Scenario {
            name: "deep grant adds to inherited privileges",
            steps: vec![
                Step::Grant("", P::GRANT),
                Step::Grant("mydb", P::SELECT),
                Step::Grant("mydb.autogen.cpu", P::DELETE | P::DROP),
            ],
            expect: vec![
                expect("mydb.autogen.cpu", P::GRANT | P::SELECT | P::DELETE | P::DROP, true),
                expect("mydb", P::DELETE, false),
                expect("mydb.autogen", P::SELECT, true),
            ],
        },
        Scenario {
            name: "set all grants everything",
            steps: vec![Step::SetAll],
            expect: vec![
                expect("db.rp.m", P::ALL_RESOURCE, true),
                expect("db.rp.m", P::ALL_GLOBAL, true),
            ],
        },
        Scenario {
            name: "clear all revokes everything",
            steps: vec![Step::SetAll, Step::ClearAll],
            expect: vec![
                expect("db.rp.m", P::ALL_RESOURCE, false),
                expect("db.rp.m", P::SELECT, false),
                expect("", P::GRANT, false),
            ],
        },
        Scenario {
            name: "deeper revoke overrides global grant",
            steps: vec![Step::Grant("", P::SELECT), Step::Revoke("db.rp", P::SELECT)],
            expect: vec![
                expect("db.rp", P::SELECT, false),
                expect("db.rp.cpu", P::SELECT, false),
                expect("db", P::SELECT, true),
                expect("", P::SELECT, true),
            ],
        },
        Scenario {
            name: "union uses effective values",
            steps: vec![
                Step::Grant("", P::SELECT),
                Step::Revoke("db", P::SELECT),
                Step::Merge(vec![Step::Grant("db.rp.cpu", P::SELECT | P::INSERT)]),
            ],
            expect: vec![
                expect("db.rp.cpu", P::SELECT | P::INSERT, true),
                expect("db.rp.mem", P::SELECT, false),
                expect("db", P::SELECT, false),
                expect("other", P::SELECT, true),
                expect("other", P::INSERT, false),
            ],
        },
        Scenario {
            name: "difference uses effective values",
            steps: vec![
                Step::Grant("", P::SELECT | P::INSERT),
                Step::Subtract(vec![
                    Step::Grant("", P::INSERT),
                    Step::Revoke("db", P::INSERT),
                ]),
            ],
            expect: vec![
                expect("db.rp", P::SELECT | P::INSERT, true),
                expect("other", P::SELECT, true),
                expect("other", P::INSERT, false),
            ],
        },
        Scenario {
            name: "legacy read and write",
            steps: vec![
                Step::Grant("", P::READ),
                Step::Revoke("mydb", P::READ),
                Step::Grant("yourdb", P::WRITE),
                Step::Grant("mydb.rp", P::SELECT | P::CREATE_CQ),
            ],
            expect: vec![
                expect("noexists", P::READ_GROUP, true),
                expect("mydb", P::SELECT, false),
                expect("yourdb", P::WRITE_GROUP, true),
                expect("mydb.rp", P::READ, false),
            ],
        },
    ]
}

/// Check every scenario.
///
/// Returns `(name, passed, first failing expectation or "ok")` per scenario.
pub fn verify_all_scenarios() -> Vec<(String, bool, String)> {
    all_scenarios()
        .iter()
        .map(|scenario| {
            let tree = scenario.build();
            let failure = scenario
                .expect
                .iter()
                .find(|e| tree.contain(&path(e.path), e.privilege) != e.held);

            match failure {
                Some(e) => (
                    scenario.name.to_string(),
                    false,
                    format!("contain({:?}, {}) should be {}", e.path, e.privilege, e.held),
                ),
                None => (scenario.name.to_string(), true, "ok".to_string()),
            }
        })
        .collect()
}
