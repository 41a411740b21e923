fn main() {
    cardio_risk_lib::run()
}
