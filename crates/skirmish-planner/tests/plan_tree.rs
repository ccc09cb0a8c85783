use skirmish_planner::{
    ExecMode, ManyWorldsSearch, Method, MethodId, MethodLibrary, Plan, TaskKind, TaskSpec,
};
use skirmish_sim::{ActionFactory, CancelToken, SimAction, SimStatus, SimWorld, TickContext};

#[derive(Clone, Debug, Default, PartialEq)]
struct Log {
    done: Vec<&'static str>,
}

impl SimWorld for Log {
    type Actor = u32;
}

#[derive(Clone, Debug, PartialEq)]
enum Tsk {
    Root,
    Stage,
    Step(&'static str),
}

impl TaskSpec for Tsk {
    fn kind(&self) -> TaskKind {
        match self {
            Tsk::Root => TaskKind("root"),
            Tsk::Stage => TaskKind("stage"),
            Tsk::Step(_) => TaskKind("step"),
        }
    }
}

#[derive(Clone)]
struct StepAction {
    name: &'static str,
    done: bool,
}

impl SimAction<Log> for StepAction {
    fn status(&self) -> SimStatus {
        if self.done {
            SimStatus::CompletedSuccessfully
        } else {
            SimStatus::NotStarted
        }
    }

    fn update(&mut self, world: &mut Log, _ctx: &TickContext) {
        if !self.done {
            self.done = true;
            world.done.push(self.name);
        }
    }

    fn clone_boxed(&self) -> Box<dyn SimAction<Log>> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
struct StepFactory;

impl ActionFactory<Log> for StepFactory {
    type Spec = &'static str;

    fn build(&self, spec: &&'static str, _world: &Log) -> Box<dyn SimAction<Log>> {
        Box::new(StepAction {
            name: spec,
            done: false,
        })
    }
}

type M = Method<Tsk, &'static str, Log>;

fn step(name: &'static str) -> M {
    Method::leaf(Tsk::Step(name), move |_, _| Some(name)).with_note(name)
}

fn plan_for(goal: M) -> Plan<Tsk, &'static str, Log> {
    let search = ManyWorldsSearch::new(MethodLibrary::new(), StepFactory);
    search
        .run(goal, Log::default(), CancelToken::new())
        .next()
        .expect("single-path goal must yield a plan")
}

fn nested_goal() -> M {
    Method::sequence(
        Tsk::Root,
        vec![
            Method::sequence(Tsk::Stage, vec![step("x"), step("y")]).with_note("stage"),
            step("z"),
        ],
    )
    .with_note("root")
}

fn labels(plan: &Plan<Tsk, &'static str, Log>, ids: &[MethodId]) -> Vec<String> {
    ids.iter().map(|&id| plan.method(id).label()).collect()
}

#[test]
fn flatten_is_post_order_through_sequential_groups() {
    let plan = plan_for(nested_goal());
    let ids = plan.enumerate_sequential_actions(plan.top());

    assert_eq!(labels(&plan, &ids), vec!["x", "y", "stage", "z", "root"]);
}

#[test]
fn flatten_is_idempotent() {
    let plan = plan_for(nested_goal());
    let first = plan.enumerate_sequential_actions(plan.top());
    let second = plan.enumerate_sequential_actions(plan.top());

    assert_eq!(first, second);
}

#[test]
fn parallel_groups_stay_opaque_in_the_flattening() {
    let goal = Method::sequence(
        Tsk::Root,
        vec![
            Method::parallel(Tsk::Stage, vec![step("x"), step("y")]).with_note("stage"),
            step("z"),
        ],
    )
    .with_note("root");

    let plan = plan_for(goal);
    let ids = plan.enumerate_sequential_actions(plan.top());

    assert_eq!(labels(&plan, &ids), vec!["stage", "z", "root"]);
    // The parallel subtasks still ran forward during search.
    assert_eq!(plan.end_state().expect("end state").done, vec!["x", "y", "z"]);
}

#[test]
fn chosen_map_covers_decomposed_methods_only() {
    let plan = plan_for(nested_goal());

    let top = plan.decomposition_of(plan.top()).expect("root decomposed");
    assert_eq!(top.mode, ExecMode::Sequential);
    assert_eq!(top.subtasks.len(), 2);

    let stage = plan.decomposition_of(top.subtasks[0]).expect("stage decomposed");
    assert!(plan.decomposition_of(stage.subtasks[0]).is_none(), "leaf");
}

#[test]
fn pretty_print_renders_the_decomposition_tree() {
    let plan = plan_for(nested_goal());

    let expected = "\
root [sequential]
  stage [sequential]
    x
    y
  z
";
    assert_eq!(plan.pretty_print(), expected);
}

#[test]
fn pretty_print_matches_across_deep_copies() {
    let plan = plan_for(nested_goal());
    let copy = plan.deep_copy();

    assert_eq!(plan.pretty_print(), copy.pretty_print());
    assert_eq!(plan.start_state(), copy.start_state());
    assert_eq!(plan.end_state(), copy.end_state());
    assert_eq!(plan.arena().len(), copy.arena().len());
}

#[test]
fn pretty_print_truncates_at_the_cap() {
    let plan = plan_for(nested_goal());

    let capped = plan.pretty_print_capped(10);
    assert_eq!(capped, "...\n");

    let partial = plan.pretty_print_capped(40);
    assert!(partial.ends_with("...\n"));
    assert!(partial.starts_with("root [sequential]\n"));
    assert!(partial.len() <= 40 + "...\n".len());
}
