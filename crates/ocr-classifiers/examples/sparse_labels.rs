use ocr_classifiers::dataset::{ExtDataset, RowDataset};
use ocr_classifiers::{confusion_matrix, init_logger, summarize, top_confusions, Context};

fn main() {
    init_logger();

    // Character codes as labels: 'l', 'I' and '1' look alike, 'W' does not
    let glyphs = [('l', 10.0f32, 30.0f32), ('I', 14.0, 31.0), ('1', 18.0, 26.0), ('W', 60.0, 10.0)];

    let context = Context::with_config(
        "model=bagger,members=3,seed=7"
            .parse()
            .expect("failed to parse classifier config"),
    );
    let mut model = context.make_model().expect("failed to build classifier");

    // Feed samples one at a time, then fit once. The default buffer stores
    // features as bytes, so they are kept in 0..=255.
    let mut heldout = RowDataset::<f32>::new();
    for step in 0..40 {
        let (code, x, y) = glyphs[step % glyphs.len()];
        let jitter = (step as f32 * 0.37).sin() * 3.0;
        let features = [x + jitter, y - jitter];
        if step % 5 == 0 {
            heldout.add(&features, code as i32).expect("failed to add sample");
        } else {
            model.add(&features, code as i32).expect("failed to buffer sample");
        }
    }
    model.update_model().expect("training failed");

    let matrix = confusion_matrix(&*model, &heldout).expect("evaluation failed");
    println!("{} held-out samples, error rate {:.3}", matrix.total(), summarize(&matrix));
    for confusion in top_confusions(&matrix).iter().take(5) {
        println!(
            "  {:?} read as {:?} x{}",
            char::from_u32(confusion.truth as u32).unwrap_or('?'),
            char::from_u32(confusion.predicted as u32).unwrap_or('?'),
            confusion.count
        );
    }
}
