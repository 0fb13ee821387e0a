use declust::Dbscan;
use std::fs;

fn main() {
    let contents = fs::read_to_string("test_data.csv").expect("Unable to read file");
    let data = contents
        .lines()
        .map(|s| {
            s.split(',')
                .map(|num| num.parse::<f64>().unwrap())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let model = Dbscan::with_defaults(&data, 0.5).expect("invalid input data");
    let result = model.fit();
    if let Ok(fitted) = result {
        for label in fitted.labels() {
            println!("{label}");
        }
    }
}
