use vocab_quest::rocket_initialize;

#[rocket::launch]
fn rocket() -> _ {
    rocket_initialize()
}
