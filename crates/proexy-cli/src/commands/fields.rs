use proexy_core::oman::fields::oman_headers;
use proexy_core::proserv::proserv_headers;

pub fn list() {
    println!("Oman columns:");
    for (i, name) in oman_headers().iter().enumerate() {
        println!("  {:>2}. {name}", i + 1);
    }

    println!("\nProserv columns:");
    for (i, name) in proserv_headers().iter().enumerate() {
        println!("  {:>2}. {name}", i + 1);
    }
}
