use gozer_keyaddress::prelude::*;

fn main() {
    let params = Network::Mainnet.params();
    let key = Secret::from_wif("L4vB5fomsK8L95wQ7GFzvErYGht49JsCPJyJMHpB4xGM6xgi2jvG", &params)
        .expect("valid WIF");
    let address = Address::from_pub_key(key.pubkey(), &params); // "1F26pNMrywyZJdr22jErtKcjF8R3Ttt55G"
    let message = SignedMessage::new("Hey I just met you, and this is crazy, but I'll verify my address, maybe ...");

    let signature = sign_message(key.key(), &message).expect("32 byte hash");

    println!("Address: {}", address);
    println!("Message: {}", message);
    println!("\nSignature: {}", signature);
    println!("\nVerified: {}", verify_message(&address, &message, &signature).expect("well formed signature"));
}
