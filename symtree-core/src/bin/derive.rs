use symtree_core::{differentiate, eval, simplify, Expr, Variable};

fn main() {
    let x = Variable::named("x");

    // x^2 + 5x + 6
    let expr = x.expr().pow(Expr::num(2.0)) + Expr::num(5.0) * x.expr() + Expr::num(6.0);
    println!("{}", simplify(&expr));

    let derivative = simplify(&differentiate(&expr, &x));
    println!("{derivative}");
    println!("{derivative:?}");

    x.assign(Expr::num(2.0)).unwrap();
    println!("{:?}", eval(&expr).unwrap());
}
