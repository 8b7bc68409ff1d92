use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tessera_core::abstract_editor::{EditAction, EditActionHistory, EditActionResult, Editable};
use tessera_core::math::{Transform, Vec3, quat_from_rotation_z};

struct Counter {
    value: i64,
}

impl Editable for Counter {}

#[derive(Debug)]
struct Add(i64);

impl EditAction<Counter> for Add {
    fn apply(&mut self, target: &mut Counter) -> EditActionResult {
        target.value += self.0;
        Ok(())
    }

    fn undo(&mut self, target: &mut Counter) -> EditActionResult {
        target.value -= self.0;
        Ok(())
    }

    fn description(&self) -> &str {
        "Add"
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

fn bench_execute_undo_redo(c: &mut Criterion) {
    c.bench_function("history_execute_undo_redo_1000", |b| {
        b.iter(|| {
            let mut counter = Counter { value: 0 };
            let mut history = EditActionHistory::new(100);
            for i in 0..1000 {
                history.execute(Box::new(Add(i)), &mut counter).unwrap();
            }
            while history.undo(&mut counter).is_ok() {}
            while history.redo(&mut counter).is_ok() {}
            black_box(counter.value)
        });
    });
}

fn bench_grouped(c: &mut Criterion) {
    c.bench_function("history_group_of_100", |b| {
        b.iter(|| {
            let mut counter = Counter { value: 0 };
            let mut history = EditActionHistory::new(100);
            history.begin_group("batch");
            for i in 0..100 {
                history.execute(Box::new(Add(i)), &mut counter).unwrap();
            }
            history.end_group();
            history.undo(&mut counter).unwrap();
            black_box(counter.value)
        });
    });
}

// ---------------------------------------------------------------------------
// Math
// ---------------------------------------------------------------------------

fn bench_transform_matrix(c: &mut Criterion) {
    let transform = Transform::identity()
        .with_position(Vec3::new(10.0, 5.0, 0.0))
        .with_rotation(quat_from_rotation_z(0.3));
    c.bench_function("transform_to_matrix", |b| {
        b.iter(|| black_box(black_box(&transform).to_matrix()));
    });
}

criterion_group!(history, bench_execute_undo_redo, bench_grouped);
criterion_group!(math, bench_transform_matrix);
criterion_main!(history, math);
