extern crate rtmp_handshake;

use rtmp_handshake::handshake::{Handshake, HandshakeAction, PeerType};
use std::env;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

fn main() {
    let mut args: Vec<String> = env::args().collect();
    args.drain(0..1); // remove the executable

    if args.len() == 0 || ((args[0] != "client" && args.len() < 2) && args[0] != "server") {
        println!("No arguments provided.  One of the following must be provided");
        println!("Act as a server: server");
        println!("Act as a client: client <server host>");
    } else if args[0] == "client" {
        act_as_client(&args[1]);
    } else if args[0] == "server" {
        act_as_server();
    }
}

fn act_as_client(host_address: &str) {
    let stream = TcpStream::connect(host_address).unwrap();
    let handshake = Handshake::new(PeerType::Client);
    drive_handshake(stream, handshake);
}

fn act_as_server() {
    let listener = TcpListener::bind("127.0.0.1:1935").unwrap();
    println!("Listening on port 1935");

    for stream in listener.incoming() {
        println!("Incoming connection");
        let stream = stream.unwrap();
        let handshake = Handshake::new(PeerType::Server);
        drive_handshake(stream, handshake);
    }
}

fn drive_handshake(mut stream: TcpStream, mut handshake: Handshake) {
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();

    let mut read_buffer = [0_u8; 1024];

    loop {
        match handshake.take_action() {
            HandshakeAction::Write(bytes) => {
                stream.write_all(&bytes).unwrap();
            }

            HandshakeAction::Read => {
                let bytes_read = stream.read(&mut read_buffer).unwrap();
                if bytes_read == 0 {
                    panic!("Connection closed before the handshake completed");
                }

                match handshake.process_bytes(&read_buffer[..bytes_read]) {
                    Ok(()) => println!("Handshake still in progress"),
                    Err(error) => panic!("Handshake failed: {}", error),
                }
            }

            HandshakeAction::Finish { remaining_bytes } => {
                println!("Handshaking Completed!");
                if remaining_bytes.len() > 0 {
                    println!(
                        "{} bytes past the handshake were received",
                        remaining_bytes.len()
                    );
                }

                break;
            }
        }
    }
}
