use fitvec::DynArray;

/// Prints the live elements in index order on one line.
fn print_elements(
  label: &str,
  array: &DynArray<i32>,
) {
  print!("{label}: ");
  for value in array {
    print!("{value} ");
  }
  println!("(size = {}, capacity = {})", array.len(), array.capacity());
}

fn main() -> Result<(), fitvec::ArrayError> {
  let mut array = DynArray::new();

  // --------------------------------------------------------------------
  // 1) Push three elements. Capacity grows 0 -> 1 -> 2 -> 4.
  // --------------------------------------------------------------------
  array.push(5)?;
  array.push(3)?;
  array.push(1)?;
  print_elements("elements in the array", &array);

  // --------------------------------------------------------------------
  // 2) Checked access, in range and out of range.
  // --------------------------------------------------------------------
  println!("element at index 2: {}", array.at(2)?);
  println!("trying to access out of bounds index...");
  match array.at(10) {
    Ok(value) => println!("unexpected element {value}"),
    Err(err) => eprintln!("{err}"),
  }

  // --------------------------------------------------------------------
  // 3) Sort in place through the slice view.
  // --------------------------------------------------------------------
  array.sort();
  print_elements("elements after sorting", &array);

  // --------------------------------------------------------------------
  // 4) Pop, then clear. Clearing hands the buffer back to the allocator.
  // --------------------------------------------------------------------
  array.pop();
  print_elements("elements after popping", &array);

  array.clear();
  print_elements("after clearing", &array);

  let allocator = array.allocator().borrow();
  println!(
    "allocator: total capacity = {}, free = {} in {} block(s)",
    allocator.total_capacity(),
    allocator.free_len(),
    allocator.free_blocks().count()
  );

  Ok(())
}
