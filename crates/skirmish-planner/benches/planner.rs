use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skirmish_planner::{
    Expansion, ManyWorldsSearch, Method, MethodLibrary, TaskKind, TaskSpec,
};
use skirmish_sim::{ActionFactory, CancelToken, SimAction, SimStatus, SimWorld, TickContext};

#[derive(Clone, Debug, Default, PartialEq)]
struct Counter {
    done: u64,
}

impl SimWorld for Counter {
    type Actor = u32;
}

#[derive(Clone)]
struct TickOnce {
    done: bool,
}

impl SimAction<Counter> for TickOnce {
    fn status(&self) -> SimStatus {
        if self.done {
            SimStatus::CompletedSuccessfully
        } else {
            SimStatus::NotStarted
        }
    }

    fn update(&mut self, world: &mut Counter, _ctx: &TickContext) {
        if !self.done {
            world.done += 1;
            self.done = true;
        }
    }

    fn clone_boxed(&self) -> Box<dyn SimAction<Counter>> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
struct TickFactory;

impl ActionFactory<Counter> for TickFactory {
    type Spec = ();

    fn build(&self, _spec: &(), _world: &Counter) -> Box<dyn SimAction<Counter>> {
        Box::new(TickOnce { done: false })
    }
}

#[derive(Clone, Debug)]
struct Step;

impl TaskSpec for Step {
    fn kind(&self) -> TaskKind {
        TaskKind("step")
    }
}

type M = Method<Step, (), Counter>;

fn leaf() -> M {
    Method::leaf(Step, |_, _| Some(()))
}

fn chain(steps: usize) -> M {
    Method::sequence(Step, (0..steps).map(|_| leaf()).collect())
}

fn fanout(options: usize, steps: usize) -> M {
    Method::options(Step, move |_, _, _| {
        (0..options)
            .map(|_| Expansion::sequential((0..steps).map(|_| leaf()).collect()))
            .collect()
    })
}

fn bench_many_worlds(c: &mut Criterion) {
    let search = ManyWorldsSearch::new(MethodLibrary::new(), TickFactory);

    c.bench_function("skirmish-planner/search.first_plan(steps=256)", |b| {
        b.iter(|| {
            let plan = search
                .run(chain(256), Counter::default(), CancelToken::new())
                .next()
                .expect("plan");
            black_box(plan.arena().len());
        })
    });

    c.bench_function("skirmish-planner/search.all_plans(options=8,steps=16)", |b| {
        b.iter(|| {
            let count = search
                .run(fanout(8, 16), Counter::default(), CancelToken::new())
                .count();
            black_box(count);
        })
    });
}

criterion_group!(benches, bench_many_worlds);
criterion_main!(benches);
